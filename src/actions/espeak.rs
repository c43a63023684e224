use std::process::{Command, Stdio};
use tracing::debug;
use crate::config::SpeechConfig;

/// Speaks text through the espeak binary without waiting for it to finish.
#[derive(Clone, Debug)]
pub struct Espeak {
    config: SpeechConfig,
}

impl Espeak {
    pub fn new(config: SpeechConfig) -> Espeak {
        Espeak { config }
    }

    pub fn command(&self, text: &str) -> Command {
        let mut command = Command::new(&self.config.espeak);
        command
            .arg("-v").arg(&self.config.voice)
            .arg("-s").arg(self.config.speed.to_string())
            .arg("-p").arg(self.config.pitch.to_string())
            .arg("-k").arg(self.config.intonation.to_string())
            .arg(text)
            .stdin(Stdio::null());
        command
    }

    pub fn say(&self, text: &str) -> std::io::Result<()> {
        debug!("saying {:?}", text);
        self.command(text).spawn().map(|_| ())
    }
}
