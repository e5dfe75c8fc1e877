use remind_engine::{
    Advance, Direction, Output, PlaybackCursor, PlaybackState, SegmentSelector, Session,
    SessionSettings, Timeline, TimelineEvent, TransportCommand, seconds_to_tl,
};

fn secs(seconds: f64) -> i64 {
    seconds_to_tl(seconds)
}

fn ranges(timeline: &Timeline) -> Vec<(i64, i64)> {
    timeline
        .segments()
        .iter()
        .map(|segment| (segment.start_tl, segment.end_tl))
        .collect()
}

fn transport_commands(outputs: &[Output]) -> Vec<TransportCommand> {
    outputs
        .iter()
        .filter_map(|output| match output {
            Output::Transport(command) => Some(*command),
            _ => None,
        })
        .collect()
}

#[test]
fn split_once_and_repeat_on_same_boundary() {
    let mut timeline = Timeline::new(secs(100.0)).expect("valid duration");
    assert_eq!(ranges(&timeline), vec![(0, secs(100.0))]);

    let left = timeline.split_at(secs(30.0)).expect("split");
    assert_eq!(left, Some(0));
    assert_eq!(
        ranges(&timeline),
        vec![(0, secs(30.0)), (secs(30.0), secs(100.0))]
    );

    let repeat = timeline.split_at(secs(30.0)).expect("split");
    assert_eq!(repeat, None);
    assert_eq!(timeline.len(), 2);
}

#[test]
fn merging_back_restores_initial_state() {
    let mut timeline = Timeline::new(secs(100.0)).expect("valid duration");
    timeline.split_at(secs(30.0)).expect("split");

    timeline.merge_adjacent(0).expect("merge");

    assert_eq!(timeline, Timeline::new(secs(100.0)).expect("valid duration"));
}

#[test]
fn advancing_stops_at_last_segment() {
    let mut timeline = Timeline::new(secs(100.0)).expect("valid duration");
    timeline.split_at(secs(20.0)).expect("split");
    timeline.split_at(secs(60.0)).expect("split");
    assert_eq!(
        ranges(&timeline),
        vec![
            (0, secs(20.0)),
            (secs(20.0), secs(60.0)),
            (secs(60.0), secs(100.0))
        ]
    );

    let mut cursor = PlaybackCursor::new();
    cursor.select(&timeline, 1).expect("select");

    let moved = cursor.advance(&timeline, Direction::Next).expect("advance");
    assert_eq!(moved, Advance::Moved { index: 2 });
    let selected = cursor.selected_segment(&timeline).expect("selection");
    assert_eq!((selected.start_tl, selected.end_tl), (secs(60.0), secs(100.0)));

    let edge = cursor.advance(&timeline, Direction::Next).expect("advance");
    assert_eq!(edge, Advance::NoAdjacentSegment);
    assert_eq!(cursor.selected_index(), Some(2));
}

#[test]
fn looped_segment_restarts_on_every_completion() {
    let mut session =
        Session::new(secs(100.0), SessionSettings::default()).expect("valid session");
    session
        .handle_event(TimelineEvent::Split { at_tl: secs(20.0) })
        .expect("split");
    session
        .handle_event(TimelineEvent::Split { at_tl: secs(60.0) })
        .expect("split");
    session
        .handle_event(TimelineEvent::SelectSegment(SegmentSelector::Index(1)))
        .expect("select");
    session
        .handle_event(TimelineEvent::ToggleLoop { enabled: true })
        .expect("loop on");
    session
        .handle_event(TimelineEvent::PlayPauseToggle)
        .expect("play");
    assert_eq!(session.state(), PlaybackState::PlayingLoop);

    for _ in 0..3 {
        let outputs = session
            .handle_event(TimelineEvent::SegmentPlaybackCompleted)
            .expect("completion");
        assert_eq!(
            transport_commands(&outputs),
            vec![TransportCommand::PlayRange {
                start_tl: secs(20.0),
                end_tl: secs(60.0)
            }]
        );
        assert_eq!(session.state(), PlaybackState::PlayingLoop);
    }
}

#[test]
fn loop_restart_ends_when_loop_is_toggled_off() {
    let mut session =
        Session::new(secs(100.0), SessionSettings::default()).expect("valid session");
    session
        .handle_event(TimelineEvent::Split { at_tl: secs(50.0) })
        .expect("split");
    session
        .handle_event(TimelineEvent::LoopSegment(SegmentSelector::Time(secs(10.0))))
        .expect("loop segment");
    session
        .handle_event(TimelineEvent::ToggleLoop { enabled: false })
        .expect("loop off");

    let outputs = session
        .handle_event(TimelineEvent::SegmentPlaybackCompleted)
        .expect("completion");

    assert!(transport_commands(&outputs).is_empty());
    assert_eq!(session.state(), PlaybackState::Stopped);
}

#[test]
fn selection_keeps_its_range_when_splitting_before_it_in_a_session() {
    let mut session =
        Session::new(secs(100.0), SessionSettings::default()).expect("valid session");
    session
        .handle_event(TimelineEvent::Split { at_tl: secs(40.0) })
        .expect("split");
    session
        .handle_event(TimelineEvent::SelectSegment(SegmentSelector::Index(1)))
        .expect("select");

    session
        .handle_event(TimelineEvent::Split { at_tl: secs(15.0) })
        .expect("split");
    session
        .handle_event(TimelineEvent::Split { at_tl: secs(25.0) })
        .expect("split");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.selected, Some(3));
    let selected = snapshot.segments[3];
    assert_eq!((selected.start_tl, selected.end_tl), (secs(40.0), secs(100.0)));
}
