/// Diagnostic tool: decodes a QuarkXPress payload and prints every call the
/// composer makes, indented by nesting level.
///
/// Usage:
///     cargo run --bin qxp2raw -- [--strict] [--container TYPE CREATOR] <file>
///
/// Set `RUST_LOG=debug` to see every recovered error and unresolved
/// reference as it happens.
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;

use anyhow::{bail, Context};
use qxprust::collector::{
    DocumentSink, Ellipse, GraphicStyle, ParagraphProps, PathCommand, SpanProps, TextObjectProps,
};
use qxprust::document::ContainerInfo;
use qxprust::io::qxp::{detect_stream, QxpReader, QxpReaderConfiguration};

/// Prints each call on its own line.
#[derive(Default)]
struct RawPrinter {
    depth: usize,
    calls: usize,
}

impl RawPrinter {
    fn line(&mut self, text: String) {
        println!("{}{}", "  ".repeat(self.depth), text);
        self.calls += 1;
    }

    fn open(&mut self, text: String) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text.to_string());
    }
}

impl DocumentSink for RawPrinter {
    fn start_document(&mut self) {
        self.open("start_document".into());
    }
    fn end_document(&mut self) {
        self.close("end_document");
    }

    fn start_page(&mut self, width: f64, height: f64) {
        self.open(format!("start_page({width}, {height})"));
    }
    fn end_page(&mut self) {
        self.close("end_page");
    }

    fn open_group(&mut self, z: i32) {
        self.open(format!("open_group(z = {z})"));
    }
    fn close_group(&mut self) {
        self.close("close_group");
    }

    fn draw_path(&mut self, path: &[PathCommand], style: &GraphicStyle, z: i32) {
        let mut d = String::new();
        for command in path {
            d.push(command.action());
            if let Some(p) = command.end_point() {
                d.push_str(&format!(" {:.2},{:.2} ", p.x, p.y));
            }
        }
        self.line(format!("draw_path(z = {z}, d = \"{}\", {style:?})", d.trim_end()));
    }
    fn draw_ellipse(&mut self, ellipse: &Ellipse, style: &GraphicStyle, z: i32) {
        self.line(format!("draw_ellipse(z = {z}, {ellipse:?}, {style:?})"));
    }

    fn start_text_object(&mut self, props: &TextObjectProps) {
        self.open(format!("start_text_object({props:?})"));
    }
    fn end_text_object(&mut self) {
        self.close("end_text_object");
    }

    fn open_paragraph(&mut self, props: &ParagraphProps) {
        self.open(format!("open_paragraph({props:?})"));
    }
    fn close_paragraph(&mut self) {
        self.close("close_paragraph");
    }

    fn open_span(&mut self, props: &SpanProps) {
        self.open(format!("open_span({props:?})"));
    }
    fn close_span(&mut self) {
        self.close("close_span");
    }

    fn insert_text(&mut self, text: &str) {
        self.line(format!("insert_text({text:?})"));
    }
    fn insert_line_break(&mut self) {
        self.line("insert_line_break".into());
    }
    fn insert_tab(&mut self) {
        self.line("insert_tab".into());
    }
    fn insert_space(&mut self) {
        self.line("insert_space".into());
    }
}

struct Options {
    path: String,
    strict: bool,
    container: Option<ContainerInfo>,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut args = env::args().skip(1);
    let mut path = None;
    let mut strict = false;
    let mut container = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--strict" => strict = true,
            "--container" => {
                let (Some(type_code), Some(creator)) = (args.next(), args.next()) else {
                    bail!("--container needs a type and a creator code");
                };
                container = Some(ContainerInfo::new(type_code, creator));
            }
            _ if path.is_none() => path = Some(arg),
            _ => bail!("unexpected argument {arg}"),
        }
    }

    let Some(path) = path else {
        bail!("usage: qxp2raw [--strict] [--container TYPE CREATOR] <file>");
    };
    Ok(Options {
        path,
        strict,
        container,
    })
}

fn run() -> anyhow::Result<i32> {
    let options = parse_args()?;

    let file = File::open(&options.path).with_context(|| format!("cannot open {}", options.path))?;
    let mut stream = BufReader::new(file);

    let detection = detect_stream(&mut stream, options.container.as_ref())?;
    eprintln!(
        "{}: supported = {}, type = {}, version = {:?}",
        options.path, detection.supported, detection.document_type, detection.version
    );
    if !detection.supported {
        return Ok(qxprust::ParseStatus::UnsupportedFormat.exit_code());
    }

    let mut reader = QxpReader::from_reader(stream).with_config(QxpReaderConfiguration {
        failsafe: !options.strict,
    });
    if let Some(container) = options.container {
        reader = reader.with_container(container);
    }

    let mut printer = RawPrinter::default();
    match reader.parse(&mut printer) {
        Ok(report) => {
            eprintln!(
                "{} calls, {} notifications",
                printer.calls,
                report.notifications.len()
            );
            for notification in report.notifications.iter() {
                eprintln!("  {notification}");
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(e.status().exit_code())
        }
    }
}

fn main() {
    env_logger::init();

    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("qxp2raw: {e:#}");
            process::exit(1);
        }
    }
}
