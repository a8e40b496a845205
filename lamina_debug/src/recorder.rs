// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamped in-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event together
//! with the time it arrived, measured from the sink's creation. The
//! recording feeds [`chrome::export`](crate::chrome::export).

use std::time::Instant;

use lamina_render::trace::{
    ChainRecomputeEvent, FrameAbortEvent, FrameBeginEvent, FrameSummary, GeometryRebuildEvent,
    NodeDrawnEvent, ResourceUploadEvent, TraceSink,
};

/// One recorded event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_frame_begin`].
    FrameBegin(FrameBeginEvent),
    /// See [`TraceSink::on_chain_recompute`].
    ChainRecompute(ChainRecomputeEvent),
    /// See [`TraceSink::on_geometry_rebuild`].
    GeometryRebuild(GeometryRebuildEvent),
    /// See [`TraceSink::on_resource_upload`].
    ResourceUpload(ResourceUploadEvent),
    /// See [`TraceSink::on_node_drawn`].
    NodeDrawn(NodeDrawnEvent),
    /// See [`TraceSink::on_frame_abort`].
    FrameAbort(FrameAbortEvent),
    /// See [`TraceSink::on_frame_summary`].
    FrameSummary(FrameSummary),
}

/// A recorded event with its arrival time.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    /// Microseconds since the recorder was created.
    pub at_us: f64,
    /// The event.
    pub event: RecordedEvent,
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug)]
pub struct RecorderSink {
    start: Instant,
    records: Vec<Record>,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Timestamps count from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            records: Vec::new(),
        }
    }

    /// The recorded events in arrival order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the recorder and returns the events.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn push(&mut self, event: RecordedEvent) {
        let at_us = self.start.elapsed().as_secs_f64() * 1e6;
        self.records.push(Record { at_us, event });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.push(RecordedEvent::FrameBegin(*e));
    }

    fn on_chain_recompute(&mut self, e: &ChainRecomputeEvent) {
        self.push(RecordedEvent::ChainRecompute(*e));
    }

    fn on_geometry_rebuild(&mut self, e: &GeometryRebuildEvent) {
        self.push(RecordedEvent::GeometryRebuild(*e));
    }

    fn on_resource_upload(&mut self, e: &ResourceUploadEvent) {
        self.push(RecordedEvent::ResourceUpload(*e));
    }

    fn on_node_drawn(&mut self, e: &NodeDrawnEvent) {
        self.push(RecordedEvent::NodeDrawn(*e));
    }

    fn on_frame_abort(&mut self, e: &FrameAbortEvent) {
        self.push(RecordedEvent::FrameAbort(*e));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.push(RecordedEvent::FrameSummary(*s));
    }
}
