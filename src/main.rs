/*
 * Spatial Sandbox
 *
 * Interactive gallery of small simulations sharing one geometry core: a
 * quadtree spatial index and a SAT collision engine. Pick a module from the
 * control panel or cycle with Tab.
 *
 * Set RUST_LOG=info (or debug) to see module and config messages.
 */

use spatial_sandbox::app;

fn main() {
    env_logger::init();
    nannou::app(app::model).update(app::update).run();
}
