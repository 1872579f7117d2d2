//! motiontrace Processing Core: the motion classifier
//!
//! Turns a stream of pose skeletons into motion labels:
//! - **Metrics:** Reduce a skeleton to hip depth and wrist geometry
//! - **Classification:** Compare consecutive frames against thresholds
//! - **Label Hold:** Keep labels on screen for one video second
//! - **Aggregation:** Fold frame detections into a per-second activity log
//! - **Reference:** Read hand-annotated label timelines
//!
//! This crate does no file or process I/O.
//! Frames come in through [`PoseSource`]; overlays leave through
//! [`OverlaySink`].

pub mod aggregate;
pub mod classifier;
pub mod hold;
pub mod metrics;
pub mod reference;
pub mod session;
pub mod spans;

pub use aggregate::ActivityAggregator;
pub use classifier::{classify, FrameClassifier};
pub use hold::LabelHold;
pub use metrics::{extract, FrameMetrics, MetricsError, Vec3};
pub use reference::{ReferenceError, ReferenceTimeline};
pub use session::{
    AnalysisOutcome, AnalysisSession, FrameReport, FrameStatus, NullSink, OverlaySink,
    PoseSource, RunStats, SessionOptions, StreamSource,
};
pub use spans::{label_text, LabelSpan, SpanBuilder};
