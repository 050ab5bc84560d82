//! Fade transition inspection.
//!
//! A container opting into the fade transition keeps its CSS transition on
//! the element itself; the loader holds the fade-out for however long the
//! `opacity` transition is declared to take before swapping content.

use std::time::Duration;

/// Computed transition style of a container, as two comma-separated lists.
///
/// Mirrors `transition-property` and `transition-duration` from the
/// element's computed style (for example `"opacity, transform"` and
/// `"0.3s, 1s"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedTransition {
	/// Comma-separated transition property names.
	pub properties: String,
	/// Comma-separated transition durations, matched by index.
	pub durations: String,
}

impl ComputedTransition {
	/// Creates a transition description from the two computed-style lists.
	pub fn new(properties: impl Into<String>, durations: impl Into<String>) -> Self {
		Self {
			properties: properties.into(),
			durations: durations.into(),
		}
	}
}

/// Returns how long the `opacity` transition of a container takes.
///
/// Looks up `"opacity"` in the transition-property list and converts the
/// duration at the same index to a [`Duration`]. Returns zero when the
/// element declares no opacity transition or the duration does not parse.
pub fn opacity_fade_duration(transition: &ComputedTransition) -> Duration {
	let properties: Vec<&str> = transition.properties.split(',').map(str::trim).collect();
	let Some(index) = properties.iter().position(|property| *property == "opacity") else {
		return Duration::ZERO;
	};

	let seconds = transition
		.durations
		.split(',')
		.map(str::trim)
		.nth(index)
		.map(leading_float)
		.unwrap_or(0.0);

	if seconds.is_finite() && seconds > 0.0 {
		Duration::from_secs_f64(seconds)
	} else {
		Duration::ZERO
	}
}

/// Parses the leading numeric prefix of a computed duration like `"0.3s"`.
fn leading_float(value: &str) -> f64 {
	let end = value
		.char_indices()
		.find(|&(_, c)| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '+' | 'e' | 'E'))
		.map_or(value.len(), |(index, _)| index);

	value[..end].parse().unwrap_or(0.0)
}
