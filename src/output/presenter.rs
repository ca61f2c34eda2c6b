use std::io::{self, Write};

use super::config::{OutputConfig, OutputFormat};
use super::types::Envelope;

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

pub struct JsonPresenter { pub pretty: bool }
impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if self.pretty { serde_json::to_writer_pretty(&mut *w, env).map_err(to_io)? } else { serde_json::to_writer(&mut *w, env).map_err(to_io)? }
        writeln!(w)
    }
}

/// Human output: the rendered text of the result, followed by the raw result when pretty.
pub struct TextPresenter { pub pretty: bool }
impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if env.text.is_empty() {
            writeln!(w, "Result: {}", env.op)?;
        } else {
            write!(w, "{}", env.text)?;
            if !env.text.ends_with('\n') { writeln!(w)?; }
        }
        if self.pretty {
            if let Some(res) = &env.result { serde_json::to_writer_pretty(&mut *w, res).map_err(to_io)?; writeln!(w)?; }
        }
        Ok(())
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_env(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout();
        self.presenter.emit(env, &mut out)?;
        out.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::new(io::ErrorKind::Other, e) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::types::TextView;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Count { total: usize }

    impl TextView for Count {
        fn render_text(&self) -> String { format!("{} recipes found", self.total) }
    }

    fn render(p: &dyn Presenter, env: &Envelope) -> String {
        let mut buf = Vec::new();
        p.emit(env, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_presenter_prints_rendered_view() {
        let env = Envelope::result("ls", &Count { total: 3 }, None).unwrap();
        assert_eq!(render(&TextPresenter { pretty: false }, &env), "3 recipes found\n");
    }

    #[test]
    fn json_presenter_prints_envelope_without_text() {
        let env = Envelope::result("ls", &Count { total: 3 }, None).unwrap();
        let out = render(&JsonPresenter { pretty: false }, &env);
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["op"], "ls");
        assert_eq!(v["result"]["total"], 3);
        assert!(v.get("text").is_none());
    }
}
