//! Tick scheduler tests: one frame per wake, fault handling, backlog
//! handling, and stop acting as a join.
mod helpers {
    include!("../../helpers/mod.rs");
}

use helpers::{channel_sink, drain, BusProbe, ManualTicks, MockCanBus, TickDriver};
use korri_tx::error::{TickError, TimerError};
use korri_tx::protocol::periodic::{
    assembler::{FrameAssembler, TX_FRAME_ID},
    run_state::{RunControl, RunState},
    scheduler::{SchedulerState, TickScheduler},
};
use korri_tx::protocol::transport::can_frame::CanFrame;
use korri_tx::protocol::transport::traits::can_bus::CanBus;
use embedded_can::{Id, StandardId};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{timeout, Duration};

const STEP: Duration = Duration::from_secs(2);

struct Harness {
    scheduler: TickScheduler<MockCanBus>,
    driver: TickDriver,
    bus_rx: UnboundedReceiver<CanFrame>,
    sink_rx: UnboundedReceiver<CanFrame>,
    probe: BusProbe,
    run: RunControl,
}

fn start(bus: MockCanBus, bus_rx: UnboundedReceiver<CanFrame>, probe: BusProbe) -> Harness {
    start_with(bus, bus_rx, probe, FrameAssembler::new())
}

fn start_with(
    bus: MockCanBus,
    bus_rx: UnboundedReceiver<CanFrame>,
    probe: BusProbe,
    assembler: FrameAssembler,
) -> Harness {
    let (ticks, driver) = ManualTicks::create();
    let (sink, sink_rx) = channel_sink();
    let run = RunControl::new();
    let scheduler = TickScheduler::start_with_assembler(bus, ticks, assembler, sink, run.clone());
    Harness {
        scheduler,
        driver,
        bus_rx,
        sink_rx,
        probe,
        run,
    }
}

/// Fire one tick and wait for the frame to reach the bus.
async fn tick_and_recv(h: &mut Harness) -> CanFrame {
    h.driver.tick();
    timeout(STEP, h.bus_rx.recv())
        .await
        .expect("frame expected within one step")
        .expect("bus channel open")
}

#[tokio::test]
async fn one_frame_per_tick_with_increasing_sequence() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let mut h = start(bus, bus_rx, probe);

    let mut sequence = Vec::new();
    for _ in 0..5 {
        let frame = tick_and_recv(&mut h).await;
        assert_eq!(frame.id(), Id::Standard(StandardId::new(TX_FRAME_ID).unwrap()));
        assert_eq!(frame.len(), 8);
        assert!(frame.data()[1..].iter().all(|&b| b == 0));
        sequence.push(frame.data()[0]);
    }
    assert_eq!(sequence, [0, 1, 2, 3, 4]);
    assert_eq!(h.scheduler.state(), SchedulerState::Ticking);

    let exit = h.scheduler.stop().await.expect("clean stop");
    assert_eq!(exit.frames_sent, 5);
    assert!(exit.fault.is_none());

    // Every sent frame was reported, in order.
    let reported: Vec<u8> = drain(&mut h.sink_rx).iter().map(|f| f.data()[0]).collect();
    assert_eq!(reported, [0, 1, 2, 3, 4]);
    assert_eq!(h.run.state(), RunState::StoppingRequested);
}

#[tokio::test]
async fn sequence_wraps_through_the_scheduler() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let mut h = start_with(bus, bus_rx, probe, FrameAssembler::starting_at(0xFE));

    let mut sequence = Vec::new();
    for _ in 0..4 {
        sequence.push(tick_and_recv(&mut h).await.data()[0]);
    }
    assert_eq!(sequence, [0xFE, 0xFF, 0x00, 0x01]);
    h.scheduler.stop().await.expect("clean stop");
}

#[tokio::test]
async fn backlog_produces_a_single_frame() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let mut h = start(bus, bus_rx, probe);

    h.driver.tick_after_stall(5);
    let frame = timeout(STEP, h.bus_rx.recv()).await.unwrap().unwrap();
    assert_eq!(frame.data()[0], 0);

    let exit = h.scheduler.stop().await.expect("clean stop");
    assert_eq!(exit.frames_sent, 1);
    assert_eq!(exit.missed_ticks, 5);
    assert!(drain(&mut h.bus_rx).is_empty(), "no catch-up burst");
    assert_eq!(h.probe.sends(), 1);
}

#[tokio::test]
async fn send_failure_faults_the_run_within_the_tick() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let mut h = start(bus.failing_on(3), bus_rx, probe);

    tick_and_recv(&mut h).await;
    tick_and_recv(&mut h).await;
    h.driver.tick();

    let state = timeout(STEP, h.run.stopped()).await.expect("run must stop");
    assert_eq!(state, RunState::StoppingFaulted);

    // Further wakes are ignored: the loop is gone.
    h.driver.tick();
    h.driver.tick();

    let exit = h.scheduler.stop().await.expect("task joined");
    assert!(matches!(exit.fault, Some(TickError::Send(_))));
    assert_eq!(exit.frames_sent, 2);
    assert_eq!(h.probe.sends(), 3);
    assert_eq!(drain(&mut h.sink_rx).len(), 2, "failed frame is not reported");
    // A later stop request does not overwrite the fault.
    assert_eq!(h.run.state(), RunState::StoppingFaulted);
}

#[tokio::test]
async fn no_send_after_stop_returns() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let mut h = start(bus, bus_rx, probe);

    tick_and_recv(&mut h).await;
    tick_and_recv(&mut h).await;

    let exit = h.scheduler.stop().await.expect("clean stop");
    let mut bus = exit.bus;
    bus.close();

    // The wake source went away with the task; nothing can reach the bus.
    h.driver.tick();
    h.driver.tick();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.probe.sends(), 2);
    assert_eq!(h.probe.sends_after_close(), 0);
    assert_eq!(h.probe.closes(), 1);
    assert!(drain(&mut h.bus_rx).is_empty());
}

#[tokio::test]
async fn stop_before_any_tick_joins_promptly() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let h = start(bus, bus_rx, probe);

    let exit = timeout(STEP, h.scheduler.stop())
        .await
        .expect("stop must not wait for a tick")
        .expect("clean stop");
    assert_eq!(exit.frames_sent, 0);
    assert!(exit.fault.is_none());
    assert_eq!(h.probe.sends(), 0);
    assert_eq!(h.run.state(), RunState::StoppingRequested);
}

#[tokio::test]
async fn stalled_wake_source_faults_the_run() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let h = start(bus, bus_rx, probe);
    let Harness {
        scheduler,
        driver,
        run,
        probe,
        ..
    } = h;

    drop(driver);
    let state = timeout(STEP, run.stopped()).await.expect("run must stop");
    assert_eq!(state, RunState::StoppingFaulted);

    let exit = scheduler.stop().await.expect("task joined");
    assert!(matches!(exit.fault, Some(TickError::Timer(TimerError::Stalled))));
    assert_eq!(probe.sends(), 0);
}

#[tokio::test]
async fn externally_stopped_run_skips_pending_tick() {
    let (bus, bus_rx, probe) = MockCanBus::create();
    let mut h = start(bus, bus_rx, probe);

    tick_and_recv(&mut h).await;
    h.run.request_stop(korri_tx::protocol::periodic::run_state::StopReason::Requested);
    h.driver.tick();

    let exit = h.scheduler.stop().await.expect("clean stop");
    assert_eq!(exit.frames_sent, 1);
    assert_eq!(h.probe.sends(), 1);
}
