use super::*;
use std::{sync::Mutex, time::Duration};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn os_filters() {
    assert_eq!(PortFilter::for_os("linux"), PortFilter::Rfcomm);
    assert_eq!(PortFilter::for_os("macos"), PortFilter::BluetoothTty);
    assert_eq!(PortFilter::for_os("windows"), PortFilter::Any);
    assert_eq!(PortFilter::for_os("solaris"), PortFilter::Any);
}

#[test]
fn rfcomm_needs_one_to_three_digits() {
    let f = PortFilter::Rfcomm;
    assert!(f.matches("/dev/rfcomm0"));
    assert!(f.matches("rfcomm123"));
    assert!(!f.matches("/dev/rfcomm"));
    assert!(!f.matches("/dev/rfcomm1234"));
    assert!(!f.matches("/dev/ttyUSB0"));
    assert!(!f.matches("/dev/rfcommX"));
}

#[test]
fn bluetooth_tty_pattern() {
    let f = PortFilter::BluetoothTty;
    assert!(f.matches("/dev/tty.LEDCTRL-DevB"));
    assert!(!f.matches("/dev/tty.-DevB"));
    assert!(!f.matches("/dev/tty.LEDCTRL-Devb"));
    assert!(!f.matches("/dev/cu.LEDCTRL-DevB"));
    assert!(!f.matches("/dev/tty.usbserial"));
}

#[test]
fn apply_keeps_order() {
    let kept = PortFilter::Rfcomm.apply(names(&["/dev/rfcomm2", "/dev/ttyS0", "/dev/rfcomm0"]));
    assert_eq!(kept, names(&["/dev/rfcomm2", "/dev/rfcomm0"]));
    assert_eq!(PortFilter::Any.apply(names(&["COM3"])), names(&["COM3"]));
}

#[test]
fn background_scan_returns_filtered_list() {
    let ports = StaticPorts(names(&["/dev/rfcomm1", "/dev/ttyACM0"]));
    let handle = spawn_discovery(Arc::new(ports), PortFilter::Rfcomm).unwrap();
    assert_eq!(handle.wait().unwrap().unwrap(), names(&["/dev/rfcomm1"]));
}

struct Gated(Mutex<mpsc::Receiver<()>>);

impl PortEnumerator for Gated {
    fn list(&self) -> LedAnimResult<Vec<String>> {
        let _ = self.0.lock().unwrap().recv_timeout(Duration::from_secs(5));
        Ok(names(&["COM1"]))
    }
}

#[test]
fn cancelled_scan_yields_nothing() {
    let (gate, open) = mpsc::channel();
    let handle =
        spawn_discovery(Arc::new(Gated(Mutex::new(open))), PortFilter::Any).unwrap();
    handle.cancel();
    gate.send(()).unwrap();
    assert!(handle.wait().is_none());
}
