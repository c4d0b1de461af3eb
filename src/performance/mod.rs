//! # Traversal Metrics
//!
//! Timing for repeated traversals of an object graph, used to compare
//! allocation policies and graph layouts.
//!
//! ## Features
//!
//! - **Traversal Time Tracking**: rolling window of traversal durations
//! - **Throughput**: objects visited per traversal and per millisecond
//! - **Allocation Snapshot**: live object counts when a tracking allocator is used
//!
//! ## Usage
//!
//! ```rust
//! use scenecore::model::{Allocator, Object};
//! use scenecore::nodes::QuadGroup;
//! use scenecore::performance::TraversalMonitor;
//! use scenecore::visit::CountObjects;
//!
//! let tree = QuadGroup::build_tree(3, None, &Allocator::default());
//! let mut monitor = TraversalMonitor::new();
//!
//! let mut counter = CountObjects::new();
//! monitor.begin_traversal();
//! tree.accept(&mut counter);
//! monitor.end_traversal(counter.total());
//!
//! assert_eq!(monitor.get_metrics().objects_visited, 85);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::model::{AllocationStats, Allocator};

/// Metrics over the current window of traversals
#[derive(Debug, Clone)]
pub struct TraversalMetrics {
    /// Traversals in the window
    pub samples: usize,
    /// Average traversal time in milliseconds
    pub traversal_time_ms: f32,
    /// Minimum traversal time in the current window
    pub min_traversal_time_ms: f32,
    /// Maximum traversal time in the current window
    pub max_traversal_time_ms: f32,
    /// Objects visited by the most recent traversal
    pub objects_visited: usize,
    /// Objects visited per millisecond, averaged over the window
    pub objects_per_ms: f32,
    /// Live objects, if the allocator tracks them
    pub live_objects: Option<usize>,
}

impl Default for TraversalMetrics {
    fn default() -> Self {
        Self {
            samples: 0,
            traversal_time_ms: 0.0,
            min_traversal_time_ms: f32::MAX,
            max_traversal_time_ms: 0.0,
            objects_visited: 0,
            objects_per_ms: 0.0,
            live_objects: None,
        }
    }
}

impl fmt::Display for TraversalMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} traversals, avg {:.3}ms (min {:.3}ms, max {:.3}ms), {} objects, {:.0} objects/ms",
            self.samples,
            self.traversal_time_ms,
            self.min_traversal_time_ms,
            self.max_traversal_time_ms,
            self.objects_visited,
            self.objects_per_ms
        )?;
        if let Some(live) = self.live_objects {
            write!(f, ", {live} live")?;
        }
        Ok(())
    }
}

/// Traversal timing monitor
pub struct TraversalMonitor {
    /// Ring buffer of recent traversal times and object counts
    samples: VecDeque<(Duration, usize)>,
    /// Maximum number of samples kept for averaging
    max_samples: usize,
    /// Start time of the current traversal
    traversal_start: Option<Instant>,
    /// Current metrics
    current_metrics: TraversalMetrics,
}

impl TraversalMonitor {
    /// Create a new monitor keeping 120 samples
    pub fn new() -> Self {
        Self::with_config(120)
    }

    /// Create a new monitor with a custom window
    pub fn with_config(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
            traversal_start: None,
            current_metrics: TraversalMetrics::default(),
        }
    }

    /// Mark the beginning of a traversal
    pub fn begin_traversal(&mut self) {
        self.traversal_start = Some(Instant::now());
    }

    /// Mark the end of a traversal that visited `objects_visited` objects
    pub fn end_traversal(&mut self, objects_visited: usize) {
        if let Some(start) = self.traversal_start.take() {
            self.record(start.elapsed(), objects_visited);
        }
    }

    /// Add a sample measured elsewhere
    pub fn record(&mut self, duration: Duration, objects_visited: usize) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back((duration, objects_visited));
        self.update_metrics();
    }

    /// Time `traversal`, which returns the number of objects it visited
    pub fn measure(&mut self, traversal: impl FnOnce() -> usize) -> usize {
        self.begin_traversal();
        let visited = traversal();
        self.end_traversal(visited);
        visited
    }

    /// Record the allocator's live object count alongside the timings
    pub fn update_allocation_stats(&mut self, allocator: &Allocator) {
        self.current_metrics.live_objects = allocator
            .stats()
            .map(|stats: AllocationStats| stats.live_objects);
    }

    fn update_metrics(&mut self) {
        let Some(&(_, last_visited)) = self.samples.back() else {
            return;
        };

        let total_time: Duration = self.samples.iter().map(|(duration, _)| *duration).sum();
        let total_visited: usize = self.samples.iter().map(|(_, visited)| *visited).sum();
        let avg_time = total_time / self.samples.len() as u32;
        let total_ms = total_time.as_secs_f32() * 1000.0;

        self.current_metrics.samples = self.samples.len();
        self.current_metrics.traversal_time_ms = avg_time.as_secs_f32() * 1000.0;
        self.current_metrics.objects_visited = last_visited;
        self.current_metrics.objects_per_ms = if total_ms > 0.0 {
            total_visited as f32 / total_ms
        } else {
            0.0
        };

        if let (Some(min_time), Some(max_time)) = (
            self.samples.iter().map(|(duration, _)| duration).min(),
            self.samples.iter().map(|(duration, _)| duration).max(),
        ) {
            self.current_metrics.min_traversal_time_ms = min_time.as_secs_f32() * 1000.0;
            self.current_metrics.max_traversal_time_ms = max_time.as_secs_f32() * 1000.0;
        }
    }

    /// Get current metrics
    pub fn get_metrics(&self) -> &TraversalMetrics {
        &self.current_metrics
    }

    /// Traversal time history in milliseconds
    pub fn get_traversal_time_history(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|(duration, _)| duration.as_secs_f32() * 1000.0)
            .collect()
    }

    /// Reset all metrics and history
    pub fn reset(&mut self) {
        self.samples.clear();
        self.current_metrics = TraversalMetrics::default();
        self.traversal_start = None;
    }
}

impl Default for TraversalMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Leaf;

    #[test]
    fn test_window_and_averages() {
        let mut monitor = TraversalMonitor::with_config(2);
        monitor.record(Duration::from_millis(2), 10);
        monitor.record(Duration::from_millis(4), 20);
        monitor.record(Duration::from_millis(6), 30);

        let metrics = monitor.get_metrics();
        assert_eq!(metrics.samples, 2);
        assert!((metrics.traversal_time_ms - 5.0).abs() < 1e-3);
        assert!((metrics.min_traversal_time_ms - 4.0).abs() < 1e-3);
        assert!((metrics.max_traversal_time_ms - 6.0).abs() < 1e-3);
        assert_eq!(metrics.objects_visited, 30);
        assert!((metrics.objects_per_ms - 5.0).abs() < 1e-3);
        assert_eq!(monitor.get_traversal_time_history().len(), 2);
    }

    #[test]
    fn test_end_without_begin_is_ignored() {
        let mut monitor = TraversalMonitor::new();
        monitor.end_traversal(5);
        assert_eq!(monitor.get_metrics().samples, 0);

        assert_eq!(monitor.measure(|| 7), 7);
        assert_eq!(monitor.get_metrics().objects_visited, 7);

        monitor.reset();
        assert!(monitor.get_traversal_time_history().is_empty());
    }

    #[test]
    fn test_allocation_snapshot() {
        let allocator = Allocator::tracking();
        let _leaf = allocator.create(Leaf::new());
        let mut monitor = TraversalMonitor::new();
        monitor.update_allocation_stats(&allocator);
        assert_eq!(monitor.get_metrics().live_objects, Some(1));
        assert!(monitor.get_metrics().to_string().ends_with("1 live"));

        monitor.update_allocation_stats(&Allocator::heap());
        assert_eq!(monitor.get_metrics().live_objects, None);
    }
}
