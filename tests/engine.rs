use std::time::Duration;

use session_timer::{TimerEngine, TimerError, TimerState};
use tokio::time::sleep;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Sleeps on the paused clock and lets expiry tasks due by then run.
async fn elapse(duration: Duration) {
    sleep(duration).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn start_reports_full_duration_and_active() {
    let engine = TimerEngine::new();
    engine.start(ms(1000));

    assert_eq!(engine.get_remaining_time(), ms(1000));
    assert!(engine.is_timer_active());
    assert_eq!(engine.get_state(), TimerState::Running);
}

#[tokio::test(start_paused = true)]
async fn expires_after_duration_for_random_durations() {
    let engine = TimerEngine::new();

    for _ in 0..20 {
        let duration = ms(fastrand::u64(1..5000));
        engine.start(duration);
        assert_eq!(engine.get_remaining_time(), duration);
        assert!(engine.is_timer_active());

        elapse(duration).await;

        assert!(!engine.is_timer_active());
        assert_eq!(engine.get_remaining_time(), Duration::ZERO);
        assert_eq!(engine.get_state(), TimerState::Idle);
    }

    assert_eq!(engine.get_statistics().expiry_count, 20);
}

#[tokio::test(start_paused = true)]
async fn remaining_time_tracks_the_clock() {
    let engine = TimerEngine::new();
    engine.start(ms(1000));

    elapse(ms(250)).await;
    assert_eq!(engine.get_remaining_time(), ms(750));

    elapse(ms(500)).await;
    assert_eq!(engine.get_remaining_time(), ms(250));
}

#[tokio::test(start_paused = true)]
async fn queries_on_a_fresh_engine() {
    let engine = TimerEngine::new();

    assert_eq!(engine.get_remaining_time(), Duration::ZERO);
    assert!(!engine.is_timer_active());
    assert_eq!(engine.get_state(), TimerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_twice_matches_stop_once() {
    let engine = TimerEngine::new();
    engine.stop();
    assert_eq!(engine.get_state(), TimerState::Idle);

    engine.start(ms(1000));
    engine.stop();
    let once = (engine.get_state(), engine.get_remaining_time());
    engine.stop();
    let twice = (engine.get_state(), engine.get_remaining_time());

    assert_eq!(once, (TimerState::Idle, Duration::ZERO));
    assert_eq!(once, twice);
}

#[tokio::test(start_paused = true)]
async fn pause_resume_round_trip() {
    let engine = TimerEngine::new();
    engine.start(ms(1000));

    elapse(ms(300)).await;
    engine.pause();
    assert_eq!(engine.get_remaining_time(), ms(700));
    assert!(!engine.is_timer_active());
    assert_eq!(engine.get_state(), TimerState::Paused);

    elapse(ms(5000)).await;
    assert_eq!(engine.get_remaining_time(), ms(700));
    assert_eq!(engine.get_state(), TimerState::Paused);

    engine.resume();
    assert!(engine.is_timer_active());

    elapse(ms(699)).await;
    assert!(engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), ms(1));

    elapse(ms(1)).await;
    assert!(!engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn reset_restores_the_original_duration() {
    let engine = TimerEngine::new();
    engine.start(ms(1000));

    elapse(ms(400)).await;
    engine.reset();

    assert_eq!(engine.get_remaining_time(), ms(1000));
    assert!(engine.is_timer_active());

    // The earlier deadline no longer applies.
    elapse(ms(700)).await;
    assert!(engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), ms(300));

    elapse(ms(300)).await;
    assert!(!engine.is_timer_active());
}

#[tokio::test(start_paused = true)]
async fn reset_after_resume_ignores_narrowed_duration() {
    let engine = TimerEngine::new();
    engine.start(ms(1000));

    elapse(ms(600)).await;
    engine.pause();
    engine.resume();
    assert_eq!(engine.get_remaining_time(), ms(400));

    engine.reset();
    assert_eq!(engine.get_remaining_time(), ms(1000));
}

#[tokio::test(start_paused = true)]
async fn reset_while_paused_runs_again() {
    let engine = TimerEngine::new();
    engine.start(ms(1000));

    elapse(ms(400)).await;
    engine.pause();
    engine.reset();

    assert!(engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), ms(1000));

    elapse(ms(1000)).await;
    assert!(!engine.is_timer_active());
}

#[tokio::test(start_paused = true)]
async fn reset_is_a_no_op_when_idle() {
    let engine = TimerEngine::new();
    engine.reset();
    assert_eq!(engine.get_state(), TimerState::Idle);

    engine.start(ms(100));
    elapse(ms(100)).await;
    assert!(!engine.is_timer_active());

    engine.reset();
    assert!(!engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_previous_run() {
    let engine = TimerEngine::new();
    engine.start(ms(500));

    elapse(ms(200)).await;
    engine.start(ms(1000));

    // The first run's deadline passes without effect.
    elapse(ms(400)).await;
    assert!(engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), ms(600));

    elapse(ms(600)).await;
    assert!(!engine.is_timer_active());
    assert_eq!(engine.get_statistics().expiry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn paused_then_stopped_timer_never_fires() {
    let engine = TimerEngine::new();
    engine.start(ms(500));

    elapse(ms(100)).await;
    engine.pause();
    engine.stop();

    elapse(ms(2000)).await;
    assert_eq!(engine.get_state(), TimerState::Idle);
    assert_eq!(engine.get_remaining_time(), Duration::ZERO);
    assert_eq!(engine.get_statistics().expiry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn negative_millis_are_rejected_without_side_effects() {
    let engine = TimerEngine::new();
    engine.start(ms(1000));
    elapse(ms(200)).await;

    let result = engine.start_millis(-5.0);

    assert!(matches!(result, Err(TimerError::InvalidArgument(_))));
    assert!(engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), ms(800));
}

#[tokio::test(start_paused = true)]
async fn non_finite_millis_are_rejected() {
    let engine = TimerEngine::new();

    assert!(engine.start_millis(f64::NAN).is_err());
    assert!(engine.start_millis(f64::INFINITY).is_err());
    assert_eq!(engine.get_state(), TimerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn start_millis_accepts_host_numbers() {
    let engine = TimerEngine::new();

    engine.start_millis(1500.0).unwrap();
    assert_eq!(engine.get_remaining_time(), ms(1500));

    engine.start_millis(0.0).unwrap();
    assert!(engine.is_timer_active());
    assert_eq!(engine.get_remaining_time(), Duration::ZERO);
    elapse(ms(1)).await;
    assert!(!engine.is_timer_active());
}

#[tokio::test(start_paused = true)]
async fn statistics_count_pauses_and_expiries() {
    let engine = TimerEngine::new();
    engine.start(ms(300));

    elapse(ms(100)).await;
    engine.pause();
    engine.resume();
    elapse(ms(200)).await;

    let stats = engine.get_statistics();
    assert_eq!(stats.pause_count, 1);
    assert_eq!(stats.expiry_count, 1);
    assert!(stats.last_paused_at.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pause_racing_expiry_settles_one_way() {
    for _ in 0..50 {
        let engine = TimerEngine::new();
        engine.start(ms(1));
        std::thread::sleep(Duration::from_micros(fastrand::u64(500..1500)));
        engine.pause();

        let state = engine.get_state();
        let stats = engine.get_statistics();
        match state {
            TimerState::Idle => assert_eq!((stats.expiry_count, stats.pause_count), (1, 0)),
            TimerState::Paused => assert_eq!((stats.expiry_count, stats.pause_count), (0, 1)),
            TimerState::Running => panic!("timer still running after pause"),
        }

        sleep(ms(5)).await;
        assert_eq!(engine.get_state(), state);
        assert_eq!(engine.get_statistics().expiry_count, stats.expiry_count);
    }
}
