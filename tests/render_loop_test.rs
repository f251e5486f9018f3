//! Render loop, input dispatch and cross-thread control

use pointviz::{
    add_default_controls, ArrayView, BufferCopy, BufferKind, Cloud, Cuboid, Error, Event, Handle,
    HeadlessBackend, Key, KeyAction, KeyEvent, LogFile, Modifiers, MouseButton, PointViz,
    PointVizHandle, VizConfig, WindowCtx,
};
use serial_test::serial;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

fn headless(config: VizConfig) -> PointViz {
    let backend = HeadlessBackend::new(config.window_width, config.window_height)
        .with_frame_interval(Duration::from_millis(1));
    PointViz::with_backend(backend, config, LogFile::sink(false))
}

fn key_press(key: Key) -> Event {
    Event::Key {
        key,
        action: KeyAction::Press,
        mods: Modifiers::NONE,
    }
}

fn wait_until_running(handle: &PointVizHandle) {
    while !handle.running() {
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_handler_chain_stops_at_consumer() {
    let mut viz = headless(VizConfig::default());
    let calls = Arc::new(Mutex::new(Vec::new()));

    for (name, consume) in [("h1", false), ("h2", true), ("h3", false)] {
        let calls = Arc::clone(&calls);
        viz.handle()
            .push_key_handler(move |_: &PointVizHandle, _: &WindowCtx, event: KeyEvent| {
                assert_eq!(event.key, Key::K);
                calls.lock().unwrap().push(name);
                consume
            });
    }

    viz.backend().event_sender().send(key_press(Key::K));
    viz.run_once().expect("Frame failed");

    assert_eq!(*calls.lock().unwrap(), vec!["h1", "h2"]);
}

#[test]
fn test_handlers_can_reenter() {
    let mut viz = headless(VizConfig::default());
    let late_calls = Arc::new(Mutex::new(0));

    let counter = Arc::clone(&late_calls);
    viz.handle()
        .push_key_handler(move |viz: &PointVizHandle, _: &WindowCtx, _: KeyEvent| {
            // touching the scene and the handler list from a handler must not deadlock
            viz.lock().camera_mut().yaw(1.0);
            let counter = Arc::clone(&counter);
            viz.push_key_handler(move |_: &PointVizHandle, _: &WindowCtx, _: KeyEvent| {
                *counter.lock().unwrap() += 1;
                false
            });
            viz.set_running(false);
            false
        });

    let sender = viz.backend().event_sender();
    sender.send(key_press(Key::A));
    viz.run_once().unwrap();
    // registered during dispatch, so it only sees later events
    assert_eq!(*late_calls.lock().unwrap(), 0);

    sender.send(key_press(Key::A));
    viz.run_once().unwrap();
    assert_eq!(*late_calls.lock().unwrap(), 1);
    assert_eq!(viz.lock().camera().yaw_degrees(), 2.0);
}

#[test]
#[serial]
fn test_stop_from_another_thread() {
    let mut viz = headless(VizConfig::default());
    let handle = viz.handle().clone();

    let stopper = thread::spawn(move || {
        wait_until_running(&handle);
        thread::sleep(Duration::from_millis(20));
        handle.set_running(false);
    });

    viz.run().expect("Loop should stop cleanly");
    stopper.join().unwrap();

    assert!(!viz.running());
    assert!(!viz.backend().is_visible());
    assert!(viz.backend().frame_count() > 0);
}

#[test]
#[serial]
fn test_interrupt_cancels_loop() {
    let mut viz = headless(VizConfig::default().with_check_every(3));
    let handle = viz.handle().clone();

    let interrupter = thread::spawn(move || {
        wait_until_running(&handle);
        handle.interrupt();
    });

    let result = viz.run();
    interrupter.join().unwrap();

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!viz.running());
    assert!(!viz.backend().is_visible());
}

#[test]
#[serial]
fn test_mutate_while_running() {
    let mut viz = headless(VizConfig::default());
    let handle = viz.handle().clone();
    let cloud = Handle::new(Cloud::new(3).unwrap());
    viz.add(&cloud);

    let mutator = {
        let cloud = cloud.clone();
        thread::spawn(move || {
            wait_until_running(&handle);
            let key = [0.1f32, 0.2, 0.3];
            cloud
                .lock()
                .set_key(ArrayView::from_slice(&key))
                .unwrap();
            handle.update();
            thread::sleep(Duration::from_millis(20));
            handle.set_running(false);
        })
    };

    viz.run().unwrap();
    mutator.join().unwrap();

    let backend = viz.backend();
    let key = backend.buffer(cloud.id(), BufferKind::Key).unwrap();
    assert_eq!(*key, BufferCopy::F32(vec![0.1, 0.2, 0.3]));
}

#[test]
#[serial]
fn test_update_while_holding_object_lock() {
    let cloud = Handle::new(Cloud::new(3).unwrap());

    let (handle_tx, handle_rx) = mpsc::channel();
    let render = {
        let cloud = cloud.clone();
        thread::spawn(move || {
            let mut viz = headless(VizConfig::default());
            viz.add(&cloud);
            handle_tx.send(viz.handle().clone()).unwrap();
            let result = viz.run();
            let key = viz.backend().buffer(cloud.id(), BufferKind::Key).cloned();
            (result, key)
        })
    };
    let handle = handle_rx.recv().unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    {
        let cloud = cloud.clone();
        let handle = handle.clone();
        thread::spawn(move || {
            wait_until_running(&handle);
            let mut guard = cloud.lock();
            guard
                .set_key(ArrayView::from_slice(&[0.25f32, 0.5, 0.75]))
                .unwrap();
            // give the render loop time to reach this object while it is locked
            thread::sleep(Duration::from_millis(50));
            handle.update();
            assert!(!handle.add(&cloud));
            drop(guard);
            done_tx.send(()).unwrap();
        });
    }

    assert!(
        done_rx.recv_timeout(Duration::from_secs(3)).is_ok(),
        "Mutator blocked while holding an object lock"
    );
    thread::sleep(Duration::from_millis(20));
    handle.set_running(false);

    let (result, key) = render.join().unwrap();
    result.expect("Loop should stop cleanly");
    assert_eq!(key, Some(BufferCopy::F32(vec![0.25, 0.5, 0.75])));
}

#[test]
fn test_only_dirty_buffers_are_uploaded() {
    let mut viz = headless(VizConfig::default());
    let cloud = Handle::new(Cloud::new(2).unwrap());
    viz.add(&cloud);

    viz.run_once().unwrap();
    assert_eq!(viz.backend().uploads().len(), 7);

    viz.backend_mut().clear_uploads();
    viz.run_once().unwrap();
    assert!(viz.backend().uploads().is_empty());

    cloud
        .lock()
        .set_key(ArrayView::from_slice(&[0.5f32, 0.5]))
        .unwrap();
    viz.run_once().unwrap();
    let kinds: Vec<BufferKind> = viz.backend().uploads().iter().map(|u| u.kind).collect();
    assert_eq!(kinds, vec![BufferKind::Key]);
}

#[test]
fn test_update_forces_full_upload() {
    let mut viz = headless(VizConfig::default());
    let cloud = Handle::new(Cloud::new(2).unwrap());
    viz.add(&cloud);
    viz.run_once().unwrap();
    viz.backend_mut().clear_uploads();

    viz.update();
    viz.run_once().unwrap();
    assert_eq!(viz.backend().uploads().len(), 7);
    assert!(viz.backend().uploads().iter().all(|u| u.id == cloud.id()));
}

#[test]
fn test_removed_objects_are_released() {
    let mut viz = headless(VizConfig::default());
    let cuboid = Handle::new(Cuboid::default());
    let cloud = Handle::new(Cloud::new(1).unwrap());
    viz.add(&cuboid);
    viz.add(&cloud);
    viz.run_once().unwrap();

    assert!(viz.remove(&cloud));
    assert!(!viz.remove(&cloud));
    viz.run_once().unwrap();

    assert_eq!(viz.backend().released(), &[cloud.id()]);
    assert!(viz.backend().buffer(cloud.id(), BufferKind::Xyz).is_none());
    let frame = viz.backend().last_frame().unwrap();
    assert_eq!(frame.items.len(), 1);
    assert_eq!(frame.items[0].id(), cuboid.id());
}

#[test]
#[serial]
fn test_backend_failure_is_fatal() {
    let backend = HeadlessBackend::new(800, 600).fail_after(2);
    let mut viz: PointViz =
        PointViz::with_backend(backend, VizConfig::default(), LogFile::sink(false));

    let err = viz.run().unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(viz.backend().frame_count(), 2);
    assert!(!viz.running());
    assert!(!viz.backend().is_visible());
}

#[test]
#[serial]
fn test_render_on_wrong_thread() {
    let viz = headless(VizConfig::default());
    let result = thread::spawn(move || {
        let mut viz = viz;
        viz.run_once()
    })
    .join()
    .unwrap();

    assert!(matches!(result, Err(Error::WrongThread("run_once"))));
}

#[test]
fn test_default_controls() {
    let mut viz = headless(VizConfig::default());
    add_default_controls(viz.handle());
    let sender = viz.backend().event_sender();

    sender.send(key_press(Key::W));
    sender.send(key_press(Key::Key0));
    sender.send(key_press(Key::Apostrophe));
    viz.run_once().unwrap();
    {
        let scene = viz.lock();
        assert_eq!(scene.camera().pitch_degrees(), -40.0);
        assert!(scene.camera().is_orthographic());
        assert!(scene.target_display().rings_enabled());
    }
    assert_eq!(viz.backend().last_frame().unwrap().rings, Some(10.0));

    sender.send(Event::Key {
        key: Key::R,
        action: KeyAction::Press,
        mods: Modifiers::SHIFT,
    });
    viz.run_once().unwrap();
    assert_eq!(viz.lock().camera().pitch_degrees(), -45.0);
}

#[test]
fn test_left_drag_orbits() {
    let mut viz = headless(VizConfig::default());
    add_default_controls(viz.handle());
    let sender = viz.backend().event_sender();

    sender.send(Event::MousePos { x: 100.0, y: 100.0 });
    sender.send(Event::MouseButton {
        button: MouseButton::Left,
        action: KeyAction::Press,
        mods: Modifiers::NONE,
    });
    sender.send(Event::MousePos { x: 110.0, y: 100.0 });
    viz.run_once().unwrap();

    let yaw = viz.lock().camera().yaw_degrees();
    assert!((yaw - 3.0).abs() < 1e-9);
    assert!(viz.window_ctx().lbutton_down);
}

#[test]
#[serial]
fn test_escape_stops_loop() {
    let mut viz = headless(VizConfig::default());
    add_default_controls(viz.handle());
    viz.backend().event_sender().send(key_press(Key::Esc));

    viz.run().unwrap();
    assert_eq!(viz.backend().frame_count(), 1);
}
