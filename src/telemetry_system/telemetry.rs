use crate::config::LaunchDirection;
use crate::control::ascent::AscentPhase;

/// Periodic numeric read-out. Point-in-time only.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    pub time: f64,
    pub stage: i32,
    pub pitch: f64,
    pub altitude: f64,
    pub apoapsis: f64,
    pub periapsis: f64,
    pub eccentricity: f64,
    /// Seconds to burn start while a burn is scheduled.
    pub burn_countdown: Option<f64>,
    /// Seconds since ignition while a burn is running.
    pub burn_elapsed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    VesselName(String),
    MissionParameters {
        turn_start_altitude: f64,
        pitchover_angle: f64,
        target_altitude: f64,
        target_inclination: f64,
        launch_direction: LaunchDirection,
        launch_azimuth: f64,
    },
    Status { time: f64, phase: AscentPhase },
    Frame(TelemetryFrame),
    Maneuver { burn_duration: f64, delta_v: f64 },
    Error(String),
    Diagnostic(String),
}

/// Passive receiver for mission telemetry. Never feeds back into control.
pub trait TelemetrySink {
    fn emit(&mut self, event: TelemetryEvent);
}

/// Recording sink that keeps the event stream and renders a summary.
#[derive(Debug, Default)]
pub struct Telemetry {
    pub log: Vec<TelemetryEvent>,
    vessel_name: Option<String>,
    latest_frame: Option<TelemetryFrame>,
    max_altitude: f64,
    phase_times: Vec<(AscentPhase, f64)>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vessel_name(&self) -> Option<&str> {
        self.vessel_name.as_deref()
    }

    pub fn latest_frame(&self) -> Option<&TelemetryFrame> {
        self.latest_frame.as_ref()
    }

    pub fn phase_times(&self) -> &[(AscentPhase, f64)] {
        &self.phase_times
    }

    pub fn phases(&self) -> Vec<AscentPhase> {
        self.phase_times.iter().map(|(phase, _)| *phase).collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.log
            .iter()
            .filter_map(|event| match event {
                TelemetryEvent::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn maneuvers(&self) -> Vec<(f64, f64)> {
        self.log
            .iter()
            .filter_map(|event| match event {
                TelemetryEvent::Maneuver { burn_duration, delta_v } => Some((*burn_duration, *delta_v)),
                _ => None,
            })
            .collect()
    }

    fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 3600.0 {
            let hours = (elapsed_time / 3600.0).floor();
            let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
        } else if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    fn format_altitude(altitude: f64) -> String {
        if altitude.abs() >= 1000.0 {
            format!("{:.2} km", altitude / 1000.0)
        } else {
            format!("{:.2} m", altitude)
        }
    }

    fn format_frame(frame: &TelemetryFrame) -> String {
        let mut line = format!(
            "T+{} stage {} pitch {:.1}° alt {} Ap {} Pe {} e {:.4}",
            Self::format_time(frame.time),
            frame.stage,
            frame.pitch,
            Self::format_altitude(frame.altitude),
            Self::format_altitude(frame.apoapsis),
            Self::format_altitude(frame.periapsis),
            frame.eccentricity
        );
        if let Some(countdown) = frame.burn_countdown {
            line.push_str(&format!(" burn in {}", Self::format_time(countdown.max(0.0))));
        }
        if let Some(elapsed) = frame.burn_elapsed {
            line.push_str(&format!(" burning {}", Self::format_time(elapsed)));
        }
        line
    }

    pub fn display_data(&self) {
        println!("--- Telemetry ---");
        for event in &self.log {
            match event {
                TelemetryEvent::VesselName(name) => println!("Vessel: {name}"),
                TelemetryEvent::MissionParameters {
                    turn_start_altitude,
                    pitchover_angle,
                    target_altitude,
                    target_inclination,
                    launch_direction,
                    launch_azimuth,
                } => {
                    println!(
                        "Target {} at {:.1}° ({launch_direction}, azimuth {:.2}°); turn at {} pitching {:.1}°",
                        Self::format_altitude(*target_altitude),
                        target_inclination,
                        launch_azimuth,
                        Self::format_altitude(*turn_start_altitude),
                        pitchover_angle
                    );
                }
                TelemetryEvent::Status { time, phase } => {
                    println!("[{}] {phase}", Self::format_time(*time));
                }
                TelemetryEvent::Frame(_) => {}
                TelemetryEvent::Maneuver { burn_duration, delta_v } => {
                    println!("Maneuver: {:.1} m/s over {}", delta_v, Self::format_time(*burn_duration));
                }
                TelemetryEvent::Error(message) => println!("ERROR: {message}"),
                TelemetryEvent::Diagnostic(message) => println!("{message}"),
            }
        }
        println!("--- End of Telemetry ---");

        println!("\n--- Flight Summary ---");
        if let Some(name) = &self.vessel_name {
            println!("Vessel: {name}");
        }
        println!("Max Altitude: {}", Self::format_altitude(self.max_altitude));
        if let Some(frame) = &self.latest_frame {
            println!("Last frame: {}", Self::format_frame(frame));
        }

        println!("\n--- Phase Transitions ---");
        for (phase, time) in &self.phase_times {
            println!("{phase} at {}", Self::format_time(*time));
        }
    }
}

impl TelemetrySink for Telemetry {
    fn emit(&mut self, event: TelemetryEvent) {
        match &event {
            TelemetryEvent::VesselName(name) => self.vessel_name = Some(name.clone()),
            TelemetryEvent::Status { time, phase } => {
                if self.phase_times.last().map(|(last, _)| last) != Some(phase) {
                    self.phase_times.push((*phase, *time));
                }
            }
            TelemetryEvent::Frame(frame) => {
                self.max_altitude = self.max_altitude.max(frame.altitude);
                self.latest_frame = Some(frame.clone());
                // frames are point-in-time, only the latest is kept
                return;
            }
            _ => {}
        }
        self.log.push(event);
    }
}
