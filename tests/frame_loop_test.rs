use harborview::viewer::FrameLoop;

#[test]
fn should_render_frames_until_cancelled() {
    let mut frame_loop = FrameLoop::new();

    for _ in 0..3 {
        assert!(frame_loop.begin_frame());
        assert!(frame_loop.arm());
    }
    assert_eq!(frame_loop.frames_rendered(), 3);

    assert!(frame_loop.cancel());
    assert!(!frame_loop.begin_frame());
    assert!(!frame_loop.arm());
    assert_eq!(frame_loop.frames_rendered(), 3);
}

#[test]
fn should_not_begin_any_frame_after_immediate_cancel() {
    // teardown before the first scheduled callback ever fires
    let mut frame_loop = FrameLoop::new();
    assert!(frame_loop.cancel());

    assert!(!frame_loop.begin_frame());
    assert!(!frame_loop.arm());
    assert_eq!(frame_loop.frames_rendered(), 0);
}

#[test]
fn should_report_a_revoked_frame_only_once() {
    let mut frame_loop = FrameLoop::new();
    assert!(frame_loop.cancel(), "first cancel revokes the pending frame");
    assert!(!frame_loop.cancel(), "second cancel has nothing to revoke");
    assert!(frame_loop.is_cancelled());
}

#[test]
fn should_stay_cancelled_when_a_late_frame_drains() {
    let mut frame_loop = FrameLoop::new();
    frame_loop.cancel();

    // a RedrawRequested that was queued before cancellation still arrives;
    // it must neither render nor re-arm
    assert!(!frame_loop.begin_frame());
    assert!(!frame_loop.arm());
    assert!(frame_loop.is_cancelled());
}
