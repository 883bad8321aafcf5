use super::*;

#[test]
fn second_device_cannot_interrupt_active_stroke() {
    let a = DeviceToken::stylus(1);
    let b = DeviceToken::MOUSE;
    let mut arb = PointerArbiter::new();

    assert!(arb.on_pressed(a));
    assert!(!arb.on_pressed(b));
    assert!(arb.on_released(a));
    assert!(arb.on_pressed(b));
    assert_eq!(arb.owner(), Some(b));
}

#[test]
fn moves_and_releases_from_other_devices_are_rejected() {
    let a = DeviceToken::stylus(1);
    let b = DeviceToken::stylus(2);
    let mut arb = PointerArbiter::new();

    assert!(!arb.on_moved(a));
    assert!(!arb.on_released(a));

    assert!(arb.on_pressed(a));
    for _ in 0..4 {
        assert!(arb.on_moved(a));
        assert!(!arb.on_moved(b));
        assert!(!arb.on_released(b));
    }
    assert_eq!(arb.owner(), Some(a));
    assert!(arb.on_released(a));
    assert!(!arb.on_released(a));
    assert_eq!(arb.owner(), None);
}

#[test]
fn same_device_cannot_press_twice() {
    let a = DeviceToken::touch(4);
    let mut arb = PointerArbiter::new();
    assert!(arb.on_pressed(a));
    assert!(!arb.on_pressed(a));
}

#[test]
fn force_release_unlocks_a_lost_device() {
    let a = DeviceToken::stylus(9);
    let mut arb = PointerArbiter::new();
    assert!(arb.on_pressed(a));
    assert_eq!(arb.force_release(), Some(a));
    assert!(arb.on_pressed(DeviceToken::MOUSE));
}

#[test]
fn single_owner_holds_for_interleaved_sequences() {
    let devices = [
        DeviceToken::MOUSE,
        DeviceToken::stylus(1),
        DeviceToken::stylus(2),
        DeviceToken::touch(7),
    ];
    let mut arb = PointerArbiter::new();
    let mut owner: Option<DeviceToken> = None;

    // Deterministic pseudo-random walk over press/move/release for every device.
    let mut state = 0x1234_5678_u64;
    for _ in 0..500 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let dev = devices[((state >> 33) % devices.len() as u64) as usize];
        match (state >> 40) % 3 {
            0 => {
                let accepted = arb.on_pressed(dev);
                assert_eq!(accepted, owner.is_none());
                if accepted {
                    owner = Some(dev);
                }
            }
            1 => assert_eq!(arb.on_moved(dev), owner == Some(dev)),
            _ => {
                let accepted = arb.on_released(dev);
                assert_eq!(accepted, owner == Some(dev));
                if accepted {
                    owner = None;
                }
            }
        }
        assert_eq!(arb.owner(), owner);
    }
}
