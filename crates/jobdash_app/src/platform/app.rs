use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use jobdash_core::{update, AppState, Msg, UserId};
use jobdash_logging::{dash_debug, dash_info, set_dispatch_seq};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::input::{parse_command, Command, HELP};
use super::ui::render::render;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.engine_config(), msg_tx.clone())
        .context("failed to start the engine")?;
    let quit = Arc::new(AtomicBool::new(false));

    spawn_input_reader(msg_tx.clone(), quit.clone());

    // Background tick to throttle rendering.
    {
        let msg_tx = msg_tx.clone();
        thread::spawn(move || {
            while msg_tx.send(Msg::Tick).is_ok() {
                thread::sleep(TICK_INTERVAL);
            }
        });
    }

    if let Some(user) = config.user.as_deref() {
        let _ = msg_tx.send(Msg::UserSignedIn(UserId::new(user)));
    }

    let mut shell = Shell::new(AppState::with_settings(config.dashboard_settings()), runner);
    shell.print_view();
    while let Ok(msg) = msg_rx.recv() {
        if quit.load(Ordering::Relaxed) {
            break;
        }
        shell.dispatch(msg);
    }

    dash_info!("Shutting down after {} messages", shell.seq);
    shell.runner.shutdown();
    Ok(())
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
    seq: u64,
    render_pending: bool,
}

impl Shell {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            seq: 0,
            render_pending: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        self.seq += 1;
        set_dispatch_seq(self.seq);
        let is_tick = matches!(msg, Msg::Tick);
        if !is_tick {
            dash_debug!("dispatch {:?}", msg);
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.render_pending |= state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if is_tick && self.render_pending {
            self.render_pending = false;
            self.print_view();
        }
    }

    fn print_view(&self) {
        let text = render(&self.state.view());
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{text}");
        let _ = stdout.flush();
    }
}

fn spawn_input_reader(msg_tx: mpsc::Sender<Msg>, quit: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Ok(Command::Dispatch(msgs)) => {
                    for msg in msgs {
                        if msg_tx.send(msg).is_err() {
                            return;
                        }
                    }
                }
                Ok(Command::Help) => println!("{HELP}"),
                Ok(Command::Quit) => break,
                Err(err) => println!("{err}"),
            }
        }
        // End of input also quits; the wake-up lets the loop notice.
        quit.store(true, Ordering::Relaxed);
        let _ = msg_tx.send(Msg::NoOp);
    });
}
