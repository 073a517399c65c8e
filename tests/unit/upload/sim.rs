use super::*;
use std::time::Duration;

fn open(dev: &SimulatedDevice) -> Box<dyn SerialLink> {
    dev.open("sim0", &LinkSettings::default()).unwrap()
}

#[test]
fn exact_device_echoes_complete_payload() {
    let dev = SimulatedDevice::new(EchoBehavior::Exact);
    let mut link = open(&dev);
    link.write_all(&[READY, 3]).unwrap();
    link.write_all(&[7, 8]).unwrap();
    link.write_all(&[9]).unwrap();

    let mut echo = [0u8; 3];
    link.read_exact_until(&mut echo, Instant::now()).unwrap();
    assert_eq!(echo, [7, 8, 9]);
    assert_eq!(dev.log().payload(), Some(&[7u8, 8, 9][..]));
}

#[test]
fn corrupting_device_inverts_one_byte() {
    let dev = SimulatedDevice::new(EchoBehavior::CorruptAt(1));
    let mut link = open(&dev);
    link.write_all(&[READY, 2, 0x10, 0x20]).unwrap();
    let mut echo = [0u8; 2];
    link.read_exact_until(&mut echo, Instant::now()).unwrap();
    assert_eq!(echo, [0x10u8, 0xdf]);
}

#[test]
fn silent_device_times_out_at_deadline() {
    let dev = SimulatedDevice::new(EchoBehavior::Silent);
    let mut link = open(&dev);
    link.write_all(&[READY, 1, 5]).unwrap();

    let started = Instant::now();
    let mut echo = [0u8; 1];
    let err = link
        .read_exact_until(&mut echo, started + Duration::from_millis(30))
        .unwrap_err();
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert!(matches!(
        err,
        LedAnimError::ProtocolTimeout {
            expected: 1,
            received: 0
        }
    ));
}

#[test]
fn stale_input_is_counted_when_discarded() {
    let dev = SimulatedDevice::new(EchoBehavior::Exact).with_stale_input(vec![1, 2, 3]);
    let mut link = open(&dev);
    link.discard_input().unwrap();
    drop(link);

    let log = dev.log();
    assert_eq!(log.discarded, 3);
    assert_eq!(log.opened, vec!["sim0".to_string()]);
    assert_eq!(log.closed, 1);
}

#[test]
fn unavailable_device_refuses_to_open() {
    let err = SimulatedDevice::unavailable()
        .open("sim0", &LinkSettings::default())
        .err()
        .unwrap();
    assert!(matches!(err, LedAnimError::Port(_)));
}
