// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use lamina_render::trace::{
    ChainRecomputeEvent, FrameAbortEvent, FrameBeginEvent, FrameSummary, GeometryRebuildEvent,
    NodeDrawnEvent, ResourceUploadEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    verbose: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    ///
    /// Per-upload lines are suppressed until [`verbose`](Self::verbose) is
    /// turned on.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }

    /// Also print one line per resource upload.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] #{} root={} nodes={}",
            e.frame_index, e.root_index, e.node_count,
        );
    }

    fn on_chain_recompute(&mut self, e: &ChainRecomputeEvent) {
        let _ = writeln!(
            self.writer,
            "[chain] frame={} node={} links={} kind={:?}",
            e.frame_index, e.node_index, e.links, e.kind,
        );
    }

    fn on_geometry_rebuild(&mut self, e: &GeometryRebuildEvent) {
        let _ = writeln!(
            self.writer,
            "[rebuild] frame={} node={} {:?} elements={}",
            e.frame_index, e.node_index, e.kind, e.elements,
        );
    }

    fn on_resource_upload(&mut self, e: &ResourceUploadEvent) {
        if !self.verbose {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[upload] frame={} node={} {:?}/{:?} {}B",
            e.frame_index, e.node_index, e.role, e.kind, e.bytes,
        );
    }

    fn on_node_drawn(&mut self, e: &NodeDrawnEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] frame={} node={} {:?} calls={}",
            e.frame_index, e.node_index, e.kind, e.draw_calls,
        );
    }

    fn on_frame_abort(&mut self, e: &FrameAbortEvent) {
        let _ = writeln!(
            self.writer,
            "[abort] frame={} at node={}",
            e.frame_index, e.node_index,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let st = &s.stats;
        let _ = writeln!(
            self.writer,
            "[summary] frame={} visited={} drawn={} culled={} calls={} \
             uploads={} ({}B) chains={} rebuilds={} moved={} removed={}",
            s.frame_index,
            st.nodes_visited,
            st.visuals_drawn,
            st.visuals_culled,
            st.draw_calls,
            st.uploads,
            st.bytes_uploaded,
            st.chain_recomputes,
            st.geometry_rebuilds,
            st.nodes_moved,
            st.nodes_removed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_render::visual::HandleRole;
    use lamina_render::{FrameStats, ResourceKind};

    #[test]
    fn pretty_print_frame() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            root_index: 0,
            node_count: 4,
        });
        sink.on_frame_summary(&FrameSummary {
            frame_index: 1,
            stats: FrameStats {
                draw_calls: 3,
                nodes_moved: 2,
                ..FrameStats::default()
            },
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[frame] #1"), "got: {output}");
        assert!(output.contains("calls=3"), "got: {output}");
        assert!(output.contains("moved=2 removed=0"), "got: {output}");
    }

    #[test]
    fn uploads_need_verbose() {
        let upload = ResourceUploadEvent {
            frame_index: 0,
            node_index: 2,
            role: HandleRole::Position,
            kind: ResourceKind::Vertex,
            bytes: 36,
        };
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_resource_upload(&upload);
        assert!(quiet.into_inner().is_empty());

        let mut loud = PrettyPrintSink::with_writer(Vec::<u8>::new()).verbose(true);
        loud.on_resource_upload(&upload);
        let output = String::from_utf8(loud.into_inner()).unwrap();
        assert!(output.contains("Position/Vertex 36B"), "got: {output}");
    }
}
