//! Timing directive for the speech synthesis call.
//!
//! Turns a script into the instruction text the synthesizer receives: one
//! anchor line per segment plus the timing rules it must follow. The rules
//! are requests. Only the total length is enforced afterwards, by
//! resampling.

use std::fmt::Write;

use crate::models::{PerformanceProfile, TimedSegment};
use crate::voice::VoiceIdentity;

/// Default per-segment start/end tolerance requested from the synthesizer.
pub const DEFAULT_TOLERANCE_MS: u32 = 40;

/// One segment's time slot and text.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub index: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub emotion: String,
    pub emphasis: Vec<String>,
}

impl Anchor {
    fn from_segment(segment: &TimedSegment) -> Self {
        Self {
            index: segment.index,
            start: segment.start_time,
            end: segment.end_time,
            text: segment.narration_text.clone(),
            emotion: segment.emotion_tag.clone(),
            emphasis: segment.emphasis_markers.clone(),
        }
    }

    /// `[start–end]: "text"` with millisecond precision.
    pub fn line(&self) -> String {
        format!("[{:.3}–{:.3}]: \"{}\"", self.start, self.end, self.text)
    }
}

/// Read-only synthesis instruction derived from a script.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingDirective {
    anchors: Vec<Anchor>,
    detected_tone: String,
    profile: PerformanceProfile,
    total_duration: f64,
    tolerance_ms: u32,
}

/// Build the directive for a full narration, keeping segment order.
pub fn build_directive(
    segments: &[TimedSegment],
    detected_tone: &str,
    total_duration: f64,
) -> TimingDirective {
    TimingDirective {
        anchors: segments.iter().map(Anchor::from_segment).collect(),
        detected_tone: detected_tone.to_string(),
        profile: PerformanceProfile::default(),
        total_duration,
        tolerance_ms: DEFAULT_TOLERANCE_MS,
    }
}

/// Build a directive for auditioning one segment on its own.
///
/// The anchor is shifted to start at zero so the clip carries no
/// leading silence.
pub fn preview_directive(segment: &TimedSegment, detected_tone: &str) -> TimingDirective {
    let mut anchor = Anchor::from_segment(segment);
    let length = segment.duration().max(0.0);
    anchor.start = 0.0;
    anchor.end = length;

    TimingDirective {
        anchors: vec![anchor],
        detected_tone: detected_tone.to_string(),
        profile: PerformanceProfile::default(),
        total_duration: length,
        tolerance_ms: DEFAULT_TOLERANCE_MS,
    }
}

impl TimingDirective {
    pub fn with_profile(mut self, profile: PerformanceProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_tolerance_ms(mut self, tolerance_ms: u32) -> Self {
        self.tolerance_ms = tolerance_ms;
        self
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn tolerance_ms(&self) -> u32 {
        self.tolerance_ms
    }

    /// Anchor lines in input order, one per segment.
    pub fn anchor_lines(&self) -> Vec<String> {
        self.anchors.iter().map(Anchor::line).collect()
    }

    /// Full instruction text for the synthesizer.
    pub fn render(&self, voice: &VoiceIdentity) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Read the narration below as a single continuous voice-over lasting exactly {:.3} seconds.",
            self.total_duration
        );
        let _ = writeln!(out, "Voice style: {}.", voice.persona.style_hint());
        if !self.detected_tone.is_empty() {
            let _ = writeln!(out, "Overall tone: {}.", self.detected_tone);
        }
        if !self.profile.pacing.is_empty() {
            let _ = writeln!(out, "Pacing: {}.", self.profile.pacing);
        }
        if !self.profile.energy.is_empty() {
            let _ = writeln!(out, "Energy: {}.", self.profile.energy);
        }
        for note in &self.profile.delivery_notes {
            let _ = writeln!(out, "Delivery: {}.", note);
        }

        out.push_str("\nTiming rules:\n");
        let _ = writeln!(
            out,
            "1. Each line must start and end at its timestamps, within ±{}ms.",
            self.tolerance_ms
        );
        out.push_str("2. Keep silence wherever there is a gap between timestamps, at the same positions.\n");
        out.push_str("3. Match each line's own pace: do not spread speech evenly over the whole duration. Fast lines stay fast, slow lines stay slow.\n");
        out.push_str("4. Do not read the timestamps or these instructions aloud.\n");

        out.push_str("\nNarration:\n");
        for anchor in &self.anchors {
            out.push_str(&anchor.line());
            let mut hints = Vec::new();
            if !anchor.emotion.is_empty() {
                hints.push(format!("emotion: {}", anchor.emotion));
            }
            if !anchor.emphasis.is_empty() {
                hints.push(format!("stress: {}", anchor.emphasis.join(", ")));
            }
            if !hints.is_empty() {
                let _ = write!(out, " ({})", hints.join("; "));
            }
            out.push('\n');
        }

        out
    }
}
