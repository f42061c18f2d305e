/*
 * Debug Information Module
 *
 * Performance metrics and per-module counters shown in the UI and in the
 * on-canvas debug panel. Modules fill in what applies to them during their
 * update; the app resets the per-frame counters before each frame.
 */

use std::time::Duration;

use crate::quadtree::QueryStats;
use crate::sat::SatStats;

#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub physics_updates_per_frame: usize,
    pub entity_count: usize,
    pub visible_entities: usize,
    pub chunk_size: Option<usize>,
    pub culling_efficiency: f32,
    pub frustum_area_ratio: f32,
    // Spatial index
    pub tree_nodes: usize,
    pub tree_depth: u32,
    pub query_stats: QueryStats,
    // Narrow phase
    pub sat_stats: SatStats,
    // Free-form status line from the active module (score, flags)
    pub status: String,
}

impl DebugInfo {
    // Clear counters that accumulate during a frame
    pub fn begin_frame(&mut self) {
        self.query_stats.reset();
        self.sat_stats = SatStats::default();
        self.physics_updates_per_frame = 0;
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Entities: {} ({} visible)", self.entity_count, self.visible_entities),
        ];
        if self.tree_nodes > 0 {
            lines.push(format!("Tree: {} nodes, depth {}", self.tree_nodes, self.tree_depth));
            lines.push(format!(
                "Queries: {} ({} nodes, {} tests)",
                self.query_stats.queries, self.query_stats.nodes_visited, self.query_stats.entities_tested
            ));
        }
        if self.sat_stats.checks > 0 {
            lines.push(format!(
                "SAT: {} checks, {} AABB rejects, {} axes",
                self.sat_stats.checks, self.sat_stats.aabb_rejections, self.sat_stats.axes_tested
            ));
        }
        if !self.status.is_empty() {
            lines.push(self.status.clone());
        }
        lines
    }
}
