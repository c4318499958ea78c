//! The monitoring session.
//!
//! One session watches one workspace. A single task multiplexes four
//! sources with `tokio::select!`: classified changes from the watcher, the
//! periodic idle timer, stdin commands, and Ctrl-C. All engine access
//! happens on this task; the only awaited external call is the advisor,
//! made against a copied snapshot with a bounded timeout.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use muse_core::{Decision, FeedbackSignal, Verdict};
use muse_engine::adaptive::FeedbackOutcome;
use muse_engine::state::{load_state, save_state, STATE_FILE_NAME};
use muse_engine::{score, CycleOutcome, DecisionEngine, DecisionState, RuleTable};
use muse_llm::{advisor_from_settings, Advisor};
use muse_settings::MuseSettings;
use muse_watch::{ChangeFilter, Classifier, WorkspaceWatcher};

/// How often the idle timer drives an evaluation cycle.
const IDLE_TICK: Duration = Duration::from_secs(5);

/// A parsed stdin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `rate +` — the last intervention was valuable.
    RatePositive,
    /// `rate -` — the last intervention was unwelcome.
    RateNegative,
    /// `status` — show engine state.
    Status,
    /// `quit` / `exit` — end the session.
    Quit,
    /// Anything else.
    Unknown,
}

/// Parse one stdin line.
pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        "rate +" => Command::RatePositive,
        "rate -" => Command::RateNegative,
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown,
    }
}

/// One workspace-monitoring session.
pub struct Session {
    workspace: PathBuf,
    engine: DecisionEngine,
    table: RuleTable,
    watcher: WorkspaceWatcher,
    advisor: Option<Box<dyn Advisor>>,
    advisor_timeout: Duration,
}

impl Session {
    /// Wire up a session for a workspace: restore saved state, compile the
    /// rule table, start the watcher, and build the advisor if possible.
    pub fn new(workspace: PathBuf, settings: &MuseSettings) -> anyhow::Result<Self> {
        let state = match load_state(&workspace) {
            Some(persisted) => {
                DecisionState::from_persisted(&persisted, &settings.engine.threshold)
            }
            None => DecisionState::new(&settings.engine.threshold),
        };
        let engine = DecisionEngine::new(settings.engine.clone(), state);

        let table = RuleTable::compile(&settings.rules);
        if table.disabled_count() > 0 {
            warn!(
                disabled = table.disabled_count(),
                "some scoring rules are disabled"
            );
        }

        let filter = ChangeFilter::from_settings(&settings.watcher)
            .context("building path filter")?
            .ignore_file(STATE_FILE_NAME);
        let classifier = Classifier::new(settings.watcher.max_file_bytes);
        let watcher = WorkspaceWatcher::start(&workspace, filter, classifier)
            .context("starting filesystem watcher")?;

        let advisor = match advisor_from_settings(&settings.llm) {
            Ok(advisor) => {
                info!(provider = advisor.name(), "advisor ready");
                Some(advisor)
            }
            Err(err) => {
                warn!(error = %err, "advisor unavailable, running heuristic-only");
                None
            }
        };

        Ok(Self {
            workspace,
            engine,
            table,
            watcher,
            advisor,
            advisor_timeout: Duration::from_millis(settings.llm.timeout_ms),
        })
    }

    /// Run until the watcher closes, `quit`, or Ctrl-C.
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(workspace = %self.workspace.display(), "session started");
        println!(
            "muse is watching {} (threshold {}). Commands: rate + | rate - | status | quit",
            self.workspace.display(),
            self.engine.state().threshold,
        );

        // Ctrl-C races the loop itself so an in-flight advisor call is
        // simply dropped; the engine never saw a resolve for it.
        tokio::select! {
            result = self.event_loop() => result?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
            }
        }

        self.persist();
        Ok(())
    }

    async fn event_loop(&mut self) -> anyhow::Result<()> {
        let mut idle = tokio::time::interval(IDLE_TICK);
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            tokio::select! {
                change = self.watcher.next() => {
                    let Some(record) = change else {
                        warn!("watcher channel closed");
                        return Ok(());
                    };
                    let scored = score(record, &self.table);
                    let outcome = self.engine.observe(scored, Instant::now());
                    self.handle_outcome(outcome).await;
                }
                _ = idle.tick() => {
                    let outcome = self.engine.idle_tick(Instant::now());
                    self.handle_outcome(outcome).await;
                }
                line = lines.next_line() => {
                    match line.context("reading stdin")? {
                        Some(line) => {
                            if self.handle_command(parse_command(&line)) {
                                return Ok(());
                            }
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    async fn handle_outcome(&mut self, outcome: CycleOutcome) {
        let snapshot = match outcome {
            CycleOutcome::Ready(snapshot) => snapshot,
            CycleOutcome::Idle => return,
            CycleOutcome::Accumulating {
                total_score,
                threshold,
            } => {
                debug!(total_score, threshold, "accumulating");
                return;
            }
            CycleOutcome::Cooldown { remaining } => {
                debug!(remaining_secs = remaining.as_secs(), "in cooldown");
                return;
            }
        };

        let verdict = match &self.advisor {
            Some(advisor) if self.engine.advisor_gate_enabled() => {
                consult(advisor.as_ref(), self.advisor_timeout, &snapshot.summary).await
            }
            Some(_) => None,
            None => {
                if self.engine.advisor_gate_enabled() {
                    debug!("advisor gate enabled but no advisor, heuristic-only");
                }
                None
            }
        };

        let decision = self.engine.resolve(snapshot, verdict, Instant::now());
        if decision.should_intervene {
            self.speak(&decision).await;
        }
    }

    async fn speak(&self, decision: &Decision) {
        let text = match &self.advisor {
            Some(advisor) => {
                match tokio::time::timeout(self.advisor_timeout, advisor.insight(&decision.summary))
                    .await
                {
                    Ok(Ok(text)) => text,
                    Ok(Err(err)) => {
                        warn!(error = %err, "insight generation failed, using summary");
                        fallback_insight(decision)
                    }
                    Err(_) => {
                        warn!("insight generation timed out, using summary");
                        fallback_insight(decision)
                    }
                }
            }
            None => fallback_insight(decision),
        };

        let stamp = chrono::Local::now().format("%H:%M:%S");
        println!("\n[{stamp}] muse: {text}");
        println!("        (rate + if helpful, rate - if not)");
    }

    /// Returns true when the session should end.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::RatePositive => self.rate(FeedbackSignal::Positive),
            Command::RateNegative => self.rate(FeedbackSignal::Negative),
            Command::Status => self.print_status(),
            Command::Quit => return true,
            Command::Unknown => {
                println!("Commands: rate + | rate - | status | quit");
            }
        }
        false
    }

    fn rate(&mut self, signal: FeedbackSignal) {
        match self.engine.on_feedback(signal) {
            Some(FeedbackOutcome::Adjusted { previous, current }) => {
                let direction = match signal {
                    FeedbackSignal::Positive => "lowered",
                    FeedbackSignal::Negative => "raised",
                };
                println!("Thanks. Threshold {direction} from {previous} to {current}.");
            }
            Some(FeedbackOutcome::NothingToRate) => {
                println!("Nothing to rate yet.");
            }
            None => {
                println!("Adaptive learning is disabled.");
            }
        }
    }

    fn print_status(&self) {
        let state = self.engine.state();
        println!("threshold: {}", state.threshold);
        println!(
            "buffer: {} change(s), score {}",
            self.engine.buffered(),
            self.engine.total_score()
        );
        println!("interventions this session: {}", state.interventions);
        println!(
            "feedback: {} positive, {} negative",
            state.positive_feedback, state.negative_feedback
        );
    }

    fn persist(&self) {
        let persisted = self.engine.state().to_persisted();
        if let Err(err) = save_state(&self.workspace, &persisted) {
            warn!(error = %err, "could not save session state");
        } else {
            debug!(threshold = persisted.score_threshold, "session state saved");
        }
    }
}

/// The second gate: ask the advisor for a verdict, degrading to
/// heuristic-only (`None`) on any failure or timeout. Never blocks past
/// the configured timeout.
async fn consult(
    advisor: &dyn Advisor,
    timeout: Duration,
    summary: &muse_core::ChangeSummary,
) -> Option<Verdict> {
    match tokio::time::timeout(timeout, advisor.assess(summary)).await {
        Ok(Ok(verdict)) => Some(verdict),
        Ok(Err(err)) => {
            warn!(error = %err, "judgment call failed, heuristic-only this cycle");
            None
        }
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "judgment call timed out, heuristic-only this cycle"
            );
            None
        }
    }
}

/// Observation used when no advisor is available or it failed.
fn fallback_insight(decision: &Decision) -> String {
    let summary = &decision.summary;
    format!(
        "Noticed {} change(s) across {} (score {}). Might be worth a look back over this stretch.",
        summary.change_count,
        summary.files.join(", "),
        summary.total_score,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
