//! # Circuit Stats Parsing
//!
//! Derives circuit statistics from two sources the compiler leaves
//! behind: the counters it prints on stdout, and the symbol table, whose
//! `main.*` entries name the top-level signals.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static NON_LINEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)non-linear constraints:\s*(\d+)").expect("static regex"));
static LINEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blinear constraints:\s*(\d+)").expect("static regex"));
static WIRES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wires:\s*(\d+)").expect("static regex"));
static PUBLIC_INPUTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)public inputs:\s*(\d+)").expect("static regex"));
static PRIVATE_INPUTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)private inputs:\s*(\d+)").expect("static regex"));
static PUBLIC_OUTPUTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)public outputs:\s*(\d+)").expect("static regex"));

/// Statistics for a compiled circuit.
///
/// Persisted alongside the artifact set so later requests can inspect a
/// circuit without recompiling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    /// Non-linear (multiplicative) constraint count.
    pub non_linear_constraints: u64,
    /// Linear constraint count.
    pub linear_constraints: u64,
    /// Wire count.
    pub wires: u64,
    /// Public input signal count.
    pub public_inputs: u64,
    /// Private input signal count.
    pub private_inputs: u64,
    /// Public output signal count.
    pub public_outputs: u64,
    /// Top-level signal names of the main component, in symbol order.
    pub main_signals: Vec<String>,
}

impl CircuitStats {
    /// Total constraint count.
    pub fn constraints(&self) -> u64 {
        self.non_linear_constraints + self.linear_constraints
    }

    /// Fold counters parsed from compiler stdout into these stats.
    pub fn absorb_stdout(&mut self, lines: &[String]) {
        for line in lines {
            if let Some(caps) = NON_LINEAR.captures(line) {
                self.non_linear_constraints = caps[1].parse().unwrap_or(0);
            } else if let Some(caps) = LINEAR.captures(line) {
                self.linear_constraints = caps[1].parse().unwrap_or(0);
            } else if let Some(caps) = WIRES.captures(line) {
                self.wires = caps[1].parse().unwrap_or(0);
            } else if let Some(caps) = PUBLIC_INPUTS.captures(line) {
                self.public_inputs = caps[1].parse().unwrap_or(0);
            } else if let Some(caps) = PRIVATE_INPUTS.captures(line) {
                self.private_inputs = caps[1].parse().unwrap_or(0);
            } else if let Some(caps) = PUBLIC_OUTPUTS.captures(line) {
                self.public_outputs = caps[1].parse().unwrap_or(0);
            }
        }
    }

    /// Fold the symbol table into these stats.
    ///
    /// Symbol lines have the form `#s,#w,#c,name`. Entries named
    /// `main.<signal>` (with no deeper nesting) are the main component's
    /// own signals.
    pub fn absorb_symbols(&mut self, sym_content: &str) {
        for line in sym_content.lines() {
            let Some(name) = line.rsplit(',').next() else {
                continue;
            };
            let name = name.trim();
            if let Some(signal) = name.strip_prefix("main.") {
                if !signal.is_empty() && !signal.contains('.') {
                    let owned = signal.to_string();
                    if !self.main_signals.contains(&owned) {
                        self.main_signals.push(owned);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_stdout_counters() {
        let mut stats = CircuitStats::default();
        stats.absorb_stdout(&lines(&[
            "template instances: 1",
            "non-linear constraints: 1",
            "linear constraints: 0",
            "public inputs: 0",
            "private inputs: 2",
            "public outputs: 1",
            "wires: 4",
            "labels: 4",
        ]));
        assert_eq!(stats.non_linear_constraints, 1);
        assert_eq!(stats.linear_constraints, 0);
        assert_eq!(stats.constraints(), 1);
        assert_eq!(stats.wires, 4);
        assert_eq!(stats.public_inputs, 0);
        assert_eq!(stats.private_inputs, 2);
        assert_eq!(stats.public_outputs, 1);
    }

    #[test]
    fn linear_regex_does_not_eat_non_linear() {
        let mut stats = CircuitStats::default();
        stats.absorb_stdout(&lines(&["non-linear constraints: 7"]));
        assert_eq!(stats.non_linear_constraints, 7);
        assert_eq!(stats.linear_constraints, 0);
    }

    #[test]
    fn symbol_table_collects_main_signals_in_order() {
        let mut stats = CircuitStats::default();
        stats.absorb_symbols("1,1,0,main.c\n2,2,0,main.a\n3,3,0,main.b\n4,4,1,main.sub.x\n");
        assert_eq!(stats.main_signals, vec!["c", "a", "b"]);
    }

    #[test]
    fn symbol_table_ignores_malformed_lines() {
        let mut stats = CircuitStats::default();
        stats.absorb_symbols("garbage\n\n1,1,0,other.c\n1,1,0,main.\n");
        assert!(stats.main_signals.is_empty());
    }

    #[test]
    fn stats_serde_round_trip() {
        let mut stats = CircuitStats::default();
        stats.absorb_stdout(&lines(&["wires: 12"]));
        stats.absorb_symbols("1,1,0,main.out\n");
        let json = serde_json::to_string(&stats).unwrap();
        let back: CircuitStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
