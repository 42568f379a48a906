use super::*;
use crate::fullscreen::FullscreenChain;
use crate::test_support::{FakeMedia, ScriptedCall};

fn controller_with(media: &FakeMedia) -> PlaybackController {
    PlaybackController::new(Box::new(media.clone()), Box::new(FullscreenChain::unsupported()))
}

fn ready_controller(media: &FakeMedia, duration: f64) -> PlaybackController {
    let mut controller = controller_with(media);
    controller.load("https://cdn.example/ep1.mp4", 0.0);
    media.set_duration(duration);
    controller.handle_event(&MediaEvent::LoadedMetadata);
    controller
}

#[test]
fn test_load_defers_seek_until_metadata() {
    let media = FakeMedia::new();
    let mut controller = controller_with(&media);

    controller.load("https://cdn.example/movie.mp4", 30.0);
    assert_eq!(controller.state(), PlaybackState::Loading);
    assert!(controller.is_loading());
    assert_eq!(media.state().preload, Some(Preload::Auto));
    assert_eq!(media.calls(), vec!["src:https://cdn.example/movie.mp4", "load"]);

    media.set_duration(600.0);
    let outcome = controller.handle_event(&MediaEvent::LoadedMetadata);
    assert_eq!(outcome, EventOutcome::Started { at: 30.0 });
    assert_eq!(media.current_time(), 30.0);
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert!(controller.session().is_playing);
    assert_eq!(controller.session().duration, 600.0);

    // A later CanPlay must not seek again.
    media.clear_calls();
    assert_eq!(controller.handle_event(&MediaEvent::CanPlay), EventOutcome::None);
    assert!(media.calls().is_empty());
}

#[test]
fn test_zero_start_does_not_seek() {
    let media = FakeMedia::new();
    let mut controller = controller_with(&media);

    controller.load("https://cdn.example/movie.mp4", 0.0);
    controller.handle_event(&MediaEvent::CanPlay);

    assert!(!media.calls().iter().any(|c| c.starts_with("seek:")));
    assert!(media.calls().contains(&"play".to_string()));
}

#[test]
fn test_autoplay_rejection_leaves_paused() {
    let media = FakeMedia::new();
    media.block_autoplay(true);
    let mut controller = controller_with(&media);

    controller.load("https://cdn.example/movie.mp4", 12.0);
    let outcome = controller.handle_event(&MediaEvent::LoadedMetadata);

    assert_eq!(outcome, EventOutcome::Started { at: 12.0 });
    assert!(!controller.session().is_playing);
    assert_eq!(controller.state(), PlaybackState::Ready);

    media.block_autoplay(false);
    controller.toggle_play();
    assert!(controller.session().is_playing);
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[test]
fn test_error_before_ready_fails_load() {
    let media = FakeMedia::new();
    let mut controller = controller_with(&media);

    controller.load("https://cdn.example/missing.mp4", 0.0);
    let outcome = controller.handle_event(&MediaEvent::Error("MEDIA_ERR_SRC_NOT_SUPPORTED".into()));

    assert_eq!(outcome, EventOutcome::Failed);
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(!controller.is_loading());
}

#[test]
fn test_seek_clamps_to_bounds() {
    let media = FakeMedia::new();
    let mut controller = ready_controller(&media, 100.0);

    assert_eq!(controller.seek(-10.0), 0.0);
    assert_eq!(media.current_time(), 0.0);

    media.set_time(96.0);
    assert_eq!(controller.skip(10.0), 100.0);
    assert_eq!(media.current_time(), 100.0);

    assert_eq!(controller.seek(f64::NAN), 0.0);
}

#[test]
fn test_seek_without_duration_only_clamps_below() {
    let media = FakeMedia::new();
    let mut controller = controller_with(&media);
    controller.load("https://cdn.example/live.mp4", 0.0);

    assert_eq!(controller.seek(5000.0), 5000.0);
    assert_eq!(controller.seek(-1.0), 0.0);
}

#[test]
fn test_volume_and_mute_are_coupled() {
    let media = FakeMedia::new();
    let mut controller = ready_controller(&media, 100.0);

    controller.set_volume(0.0);
    assert!(controller.session().is_muted);
    assert!(media.state().muted);

    controller.set_volume(0.5);
    assert!(!controller.session().is_muted);
    assert!(!media.state().muted);
    assert_eq!(media.state().volume, 0.5);

    assert_eq!(controller.set_volume(3.0), 1.0);
    assert_eq!(controller.set_volume(-1.0), 0.0);
}

#[test]
fn test_unmute_at_zero_volume_restores_level() {
    let media = FakeMedia::new();
    let mut controller = ready_controller(&media, 100.0);

    controller.set_volume(0.0);
    assert!(!controller.toggle_mute());
    assert_eq!(controller.session().volume, 1.0);
    assert!(controller.toggle_mute());
    assert_eq!(controller.session().volume, 1.0);
}

#[test]
fn test_buffering_flag_only_while_started() {
    let media = FakeMedia::new();
    let mut controller = controller_with(&media);

    controller.load("https://cdn.example/movie.mp4", 0.0);
    controller.handle_event(&MediaEvent::Waiting);
    assert!(!controller.session().is_buffering);

    controller.handle_event(&MediaEvent::CanPlay);
    controller.handle_event(&MediaEvent::Waiting);
    assert!(controller.session().is_buffering);

    controller.handle_event(&MediaEvent::CanPlay);
    assert!(!controller.session().is_buffering);
}

#[test]
fn test_play_pause_events_drive_state() {
    let media = FakeMedia::new();
    let mut controller = ready_controller(&media, 100.0);

    controller.handle_event(&MediaEvent::Pause);
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert!(!controller.session().is_playing);

    controller.handle_event(&MediaEvent::Play);
    assert_eq!(controller.state(), PlaybackState::Playing);

    media.set_time(42.0);
    controller.handle_event(&MediaEvent::TimeUpdate);
    assert_eq!(controller.session().current_time, 42.0);
}

#[test]
fn test_fullscreen_flag_follows_success() {
    let media = FakeMedia::new();
    let chain = FullscreenChain::new(
        vec![
            Box::new(ScriptedCall::unsupported("requestFullscreen")),
            Box::new(ScriptedCall::succeeding("webkitRequestFullscreen")),
        ],
        vec![Box::new(ScriptedCall::succeeding("exitFullscreen"))],
    );
    let mut controller = PlaybackController::new(Box::new(media), Box::new(chain));

    assert!(controller.toggle_fullscreen().unwrap());
    assert!(controller.session().is_fullscreen);
    assert!(!controller.toggle_fullscreen().unwrap());
    assert!(!controller.session().is_fullscreen);

    controller.fullscreen_changed(true);
    assert!(controller.session().is_fullscreen);
}

#[test]
fn test_fullscreen_failure_keeps_flag() {
    let media = FakeMedia::new();
    let mut controller = controller_with(&media);

    assert!(controller.toggle_fullscreen().is_err());
    assert!(!controller.session().is_fullscreen);
}

#[test]
fn test_remote_mirror_only_while_casting() {
    let media = FakeMedia::new();
    let mut controller = ready_controller(&media, 100.0);
    let status = RemoteStatus {
        current_time: 55.0,
        is_playing: false,
    };

    controller.mirror_remote(&status);
    assert_eq!(controller.session().current_time, 0.0);

    controller.set_casting(true);
    controller.mirror_remote(&status);
    assert_eq!(controller.position(), 55.0);
    assert_eq!(controller.state(), PlaybackState::Paused);

    media.set_time(3.0);
    controller.handle_event(&MediaEvent::TimeUpdate);
    assert_eq!(controller.session().current_time, 55.0);
}
