//! Real-time sample stream pumping the simulated armband at a fixed cadence

use crate::armband::{ArmbandSimulator, ConnectionState, SimulatorConfig};
use crate::signal_patterns::SignalPattern;
use fatigue_core::{config_error, FatigueResult, RawSample};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for real-time streaming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Armband simulation configuration
    pub simulator: SimulatorConfig,
    /// Ticks per second
    pub tick_rate_hz: f32,
    /// Capacity of the sample channel to the pipeline
    pub channel_buffer: usize,
    /// Begin producing samples without waiting for `Start`
    pub autostart: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            tick_rate_hz: 20.0,
            channel_buffer: 64,
            autostart: true,
        }
    }
}

impl StreamConfig {
    /// Validate the stream and its simulator
    pub fn validate(&self) -> FatigueResult<()> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0 && self.tick_rate_hz <= 10_000.0) {
            return Err(config_error!(
                "stream.tick_rate_hz",
                "must be within (0, 10000], got {}",
                self.tick_rate_hz
            ));
        }
        if self.channel_buffer == 0 {
            return Err(config_error!("stream.channel_buffer", "must be at least 1"));
        }
        self.simulator.validate()
    }

    /// Interval between ticks
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz))
    }
}

/// Commands for controlling the stream
#[derive(Debug, Clone)]
pub enum StreamCommand {
    Start,
    /// Halt and rewind the activation profile
    Stop,
    Pause,
    Resume,
    /// Simulate losing the armband; ticks continue with zeroed readings
    Disconnect,
    Reconnect,
    UpdatePattern(SignalPattern),
}

/// Summary returned when the stream finishes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStats {
    pub ticks_sent: u64,
    pub ticks_disconnected: u64,
    pub commands_handled: u64,
}

/// Sample stream delivering one [`RawSample`] per tick, in order
pub struct SampleStream {
    config: StreamConfig,
    simulator: ArmbandSimulator,
    sample_sender: mpsc::Sender<RawSample>,
    control_receiver: mpsc::Receiver<StreamCommand>,
    is_running: bool,
    stats: StreamStats,
}

impl SampleStream {
    /// Create a stream around an already-paired simulator
    pub fn new(
        config: StreamConfig,
        simulator: ArmbandSimulator,
    ) -> FatigueResult<(Self, mpsc::Receiver<RawSample>, mpsc::Sender<StreamCommand>)> {
        config.validate()?;

        let (sample_sender, sample_receiver) = mpsc::channel(config.channel_buffer);
        let (control_sender, control_receiver) = mpsc::channel(32);

        let stream = SampleStream {
            is_running: config.autostart,
            config,
            simulator,
            sample_sender,
            control_receiver,
            stats: StreamStats::default(),
        };

        Ok((stream, sample_receiver, control_sender))
    }

    /// Pump samples until the sample receiver or the control channel closes
    pub async fn run(mut self) -> FatigueResult<StreamStats> {
        let mut ticker = interval(self.config.tick_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_rate_hz = self.config.tick_rate_hz,
            running = self.is_running,
            "sample stream started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.is_running {
                        continue;
                    }

                    let sample = self.simulator.next_sample();
                    if self.simulator.connection() == ConnectionState::Disconnected {
                        self.stats.ticks_disconnected += 1;
                    }

                    if self.sample_sender.send(sample).await.is_err() {
                        debug!("sample receiver dropped, stopping stream");
                        break;
                    }
                    self.stats.ticks_sent += 1;
                }

                command = self.control_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            debug!("stream control channel closed");
                            break;
                        }
                    }
                }
            }
        }

        info!(ticks = self.stats.ticks_sent, "sample stream finished");
        Ok(self.stats)
    }

    fn handle_command(&mut self, command: StreamCommand) {
        self.stats.commands_handled += 1;

        match command {
            StreamCommand::Start | StreamCommand::Resume => {
                self.is_running = true;
                info!(?command, "stream running");
            }
            StreamCommand::Pause => {
                self.is_running = false;
                info!("stream paused");
            }
            StreamCommand::Stop => {
                self.is_running = false;
                self.simulator.reset_time();
                info!("stream stopped");
            }
            StreamCommand::Disconnect => self.simulator.disconnect(),
            StreamCommand::Reconnect => self.simulator.reconnect(),
            StreamCommand::UpdatePattern(pattern) => {
                info!(pattern = pattern.description(), "stream pattern updated");
                self.simulator.set_pattern(pattern);
            }
        }
    }
}

/// Spawn a stream in the background
///
/// Returns the ordered sample receiver, the control sender and the task
/// handle, which yields the stream's statistics when it ends.
pub fn start_sample_stream(
    config: StreamConfig,
    simulator: ArmbandSimulator,
) -> FatigueResult<(
    mpsc::Receiver<RawSample>,
    mpsc::Sender<StreamCommand>,
    JoinHandle<FatigueResult<StreamStats>>,
)> {
    let (stream, samples, control) = SampleStream::new(config, simulator)?;

    let handle = tokio::spawn(async move {
        let result = stream.run().await;
        if let Err(e) = &result {
            warn!(error = %e, "sample stream error");
        }
        result
    });

    Ok((samples, control, handle))
}
