use std::io::{self, Write};

use anyhow::Result;
use clap::Args;

use crate::config::setup::setup_options;
use crate::store::json_store::JsonStore;
use crate::timing::{Pacer, ThreadPacer};
use crate::typing::{KeystrokeEvent, ShadowBuffer, simulate_typing};
use crate::ui::console::{StatusLine, Tone};
use crate::ui::prompt::TerminalPrompter;

pub const SAMPLE_TEXT: &str = "The quick brown fox jumps over the lazy dog.";

#[derive(Args, Clone, Debug)]
pub struct TypewriterArgs {
    /// Text to type instead of the sample sentence
    #[arg(short, long, default_value = SAMPLE_TEXT)]
    pub text: String,
}

pub fn run(args: &TypewriterArgs) -> Result<()> {
    let store = JsonStore::new()?;
    let mut prompter = TerminalPrompter::stdio();
    let options = setup_options(&store, &mut prompter)?.data;

    let events = simulate_typing(&args.text, &options.input_typing);
    replay(events, &args.text, &ThreadPacer, &mut io::stdout())?;
    Ok(())
}

/// Draw each keystroke onto one console line, pausing between them.
pub fn replay<I, W>(events: I, target: &str, pacer: &dyn Pacer, out: &mut W) -> Result<String>
where
    I: IntoIterator<Item = KeystrokeEvent>,
    W: Write,
{
    let mut line = StatusLine::new(out);
    let mut shadow = ShadowBuffer::new();
    for event in events {
        shadow.apply(event.key);
        line.echo(&[], shadow.as_str(), target, Tone::Plain)?;
        pacer.pause_ms(event.delay_ms);
    }
    line.finish()?;
    Ok(shadow.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::typing::{Typist, TypingProfile};

    struct CountingPacer {
        total: Cell<Duration>,
    }

    impl Pacer for CountingPacer {
        fn pause(&self, duration: Duration) {
            self.total.set(self.total.get() + duration);
        }
    }

    #[test]
    fn test_replay_ends_on_the_target_text() {
        let pacer = CountingPacer {
            total: Cell::new(Duration::ZERO),
        };
        let rng = SmallRng::seed_from_u64(7);
        let events = Typist::new(SAMPLE_TEXT, &TypingProfile::new(120.0, 0.1), rng);
        let mut out = Vec::new();

        let typed = replay(events, SAMPLE_TEXT, &pacer, &mut out).unwrap();
        assert_eq!(typed, SAMPLE_TEXT);
        assert!(pacer.total.get() > Duration::ZERO);
        assert!(String::from_utf8(out).unwrap().ends_with('\n'));
    }
}
