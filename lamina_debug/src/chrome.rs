// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] turns a [`RecorderSink`](super::recorder::RecorderSink)
//! recording into [Chrome Trace Event Format][format] JSON.
//!
//! Each frame becomes a `B`/`E` span; node, chain, rebuild and upload events
//! are instants inside it, and the frame counters are emitted as a `C`
//! (counter) event.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{Record, RecordedEvent};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(records: &[Record], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for &Record { at_us, event } in records {
        match event {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "root": e.root_index,
                        "node_count": e.node_count,
                    }
                }));
            }
            RecordedEvent::ChainRecompute(e) => {
                events.push(instant("ChainRecompute", "Transform", at_us, json!({
                    "frame_index": e.frame_index,
                    "node": e.node_index,
                    "links": e.links,
                    "kind": format!("{:?}", e.kind),
                })));
            }
            RecordedEvent::GeometryRebuild(e) => {
                events.push(instant("GeometryRebuild", "Visual", at_us, json!({
                    "frame_index": e.frame_index,
                    "node": e.node_index,
                    "kind": format!("{:?}", e.kind),
                    "elements": e.elements,
                })));
            }
            RecordedEvent::ResourceUpload(e) => {
                events.push(instant("ResourceUpload", "Resource", at_us, json!({
                    "frame_index": e.frame_index,
                    "node": e.node_index,
                    "role": format!("{:?}", e.role),
                    "kind": format!("{:?}", e.kind),
                    "bytes": e.bytes,
                })));
            }
            RecordedEvent::NodeDrawn(e) => {
                events.push(instant("NodeDrawn", "Visual", at_us, json!({
                    "frame_index": e.frame_index,
                    "node": e.node_index,
                    "kind": format!("{:?}", e.kind),
                    "draw_calls": e.draw_calls,
                })));
            }
            RecordedEvent::FrameAbort(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "aborted_at": e.node_index,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                let st = s.stats;
                events.push(json!({
                    "ph": "C",
                    "name": "FrameStats",
                    "cat": "Summary",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "draw_calls": st.draw_calls,
                        "uploads": st.uploads,
                        "chain_recomputes": st.chain_recomputes,
                        "geometry_rebuilds": st.geometry_rebuilds,
                        "nodes_moved": st.nodes_moved,
                    }
                }));
                events.push(json!({
                    "ph": "E",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": at_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": s.frame_index,
                        "visuals_drawn": st.visuals_drawn,
                        "visuals_culled": st.visuals_culled,
                        "bytes_uploaded": st.bytes_uploaded,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use lamina_render::trace::{FrameBeginEvent, FrameSummary, NodeDrawnEvent, TraceSink};
    use lamina_render::{FrameStats, VisualKind};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            root_index: 0,
            node_count: 2,
        });
        rec.on_node_drawn(&NodeDrawnEvent {
            frame_index: 0,
            node_index: 1,
            kind: VisualKind::Mesh,
            draw_calls: 1,
        });
        rec.on_frame_summary(&FrameSummary {
            frame_index: 0,
            stats: FrameStats::default(),
        });

        let mut out = Vec::new();
        export(rec.records(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["args"]["kind"], "Mesh");
        assert_eq!(parsed[2]["ph"], "C");
        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[3]["name"], "Frame");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
