use std::cell::RefCell;
use std::rc::Rc;

use mob_core::Blackboard;
use mob_tools::{emit, TraceEvent, TraceLog, TraceSink, VecTraceSink, TRACE_LOG, TRACE_SINK};

#[derive(Clone, Default)]
struct RcSink(Rc<RefCell<Vec<TraceEvent>>>);

impl TraceSink for RcSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

#[test]
fn emit_without_keys_is_a_no_op() {
    let mut bb = Blackboard::new();
    emit(&mut bb, TraceEvent::new(0, "goal.start"));
    assert!(bb.get(TRACE_LOG).is_none());
}

#[test]
fn emit_appends_to_an_installed_log() {
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());

    emit(
        &mut bb,
        TraceEvent::new(3, "brain.activity").with_a(1).with_b(0),
    );
    emit(
        &mut bb,
        TraceEvent::new(4, "brain.behavior.start").with_a(2).with_b(60),
    );

    let log = bb.get(TRACE_LOG).unwrap();
    assert_eq!(log.events.len(), 2);
    assert_eq!(log.events[0].tag, "brain.activity");
    assert_eq!(
        (log.events[1].tick, log.events[1].a, log.events[1].b),
        (4, 2, 60)
    );
}

#[test]
fn emit_streams_into_an_installed_sink() {
    let mut bb = Blackboard::new();
    let handle = RcSink::default();
    let shared = handle.0.clone();
    bb.set(TRACE_SINK, Box::new(handle) as Box<dyn TraceSink>);

    emit(&mut bb, TraceEvent::new(7, "goal.stop").with_a(3));

    let events = shared.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tag, "goal.stop");
    assert_eq!(events[0].a, 3);
}

#[test]
fn emit_feeds_log_and_sink_together() {
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());
    let handle = RcSink::default();
    let shared = handle.0.clone();
    bb.set(TRACE_SINK, Box::new(handle) as Box<dyn TraceSink>);

    emit(&mut bb, TraceEvent::new(9, "brain.behavior.timeout").with_a(5));

    assert_eq!(bb.get(TRACE_LOG).unwrap().events.len(), 1);
    assert_eq!(shared.borrow()[0].tag, "brain.behavior.timeout");
}

#[test]
fn vec_sink_collects_in_order() {
    let mut sink = VecTraceSink::default();
    sink.emit(TraceEvent::new(1, "goal.start").with_a(0).with_b(2));
    sink.emit(TraceEvent::new(6, "goal.stop").with_a(0).with_b(2));

    assert_eq!(sink.events.len(), 2);
    assert_eq!(sink.events[0].tag, "goal.start");
    assert_eq!(sink.events[1].tick, 6);
}
