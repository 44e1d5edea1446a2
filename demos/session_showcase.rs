use async_trait::async_trait;
use std::time::Duration;
use session_timer::{HostState, SessionConfig, SessionHandler, SessionMonitor, TimerEngine};
use tokio::time::sleep;

struct PrintingHandler;

#[async_trait]
impl SessionHandler for PrintingHandler {
    async fn on_timeout(&self) -> Result<(), session_timer::TimerError> {
        println!("Session timed out!");
        Ok(())
    }

    async fn on_warning(&self, remaining: Duration) -> Result<(), session_timer::TimerError> {
        println!("Session ends in {:?}.", remaining);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    // 1. Plain countdown
    let engine = TimerEngine::new();
    engine.start(Duration::from_secs(2));
    sleep(Duration::from_millis(500)).await;
    println!("Remaining: {:?}", engine.get_remaining_time());

    // 2. Pause and resume
    engine.pause();
    sleep(Duration::from_secs(1)).await;
    println!("Still remaining while paused: {:?}", engine.get_remaining_time());
    engine.resume();

    // 3. Reset to the full duration
    engine.reset();
    println!("After reset: {:?}", engine.get_remaining_time());

    // 4. Rejected input
    if let Err(e) = engine.start_millis(-5.0) {
        println!("Error while starting timer: {}", e);
    }

    // 5. Session timeout with warnings and host lifecycle
    let config = SessionConfig::builder(Duration::from_secs(4))
        .warning_duration(Duration::from_secs(2))
        .pause_on_background(true)
        .build()
        .unwrap();
    let mut monitor = SessionMonitor::new(config, PrintingHandler).unwrap();
    monitor.start();

    sleep(Duration::from_secs(1)).await;
    println!("User activity...");
    monitor.record_activity();

    println!("App goes to background...");
    monitor.handle_host_state(HostState::Background);
    sleep(Duration::from_secs(2)).await;
    println!("App returns to foreground...");
    monitor.handle_host_state(HostState::Active);

    sleep(Duration::from_secs(5)).await;
    println!("Final state: {:?}", monitor.state());
}
