//! Virtual touchscreen via uinput
//!
//! Creates a direct-input absolute pointer sized to the panel so desktop
//! input stacks map it straight onto screen coordinates.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::thread;
use std::time::Duration;

use nix::libc::{self, c_char};
use parafb_core::traits::{EventSink, PointerEvent};
use tracing::{debug, info, warn};

use crate::error::InputError;

const UINPUT: &str = "/dev/uinput";

/// Device name shown by evtest and friends
pub const DEVICE_NAME: &str = "ILI9481 Touch";

/// Time for udev to pick up the new node before events are written
const SETTLE: Duration = Duration::from_millis(200);

/// Input-side jitter suppression (pixels)
const AXIS_FUZZ: i32 = 4;

/// Linux input constants
#[allow(dead_code)]
mod code {
    pub const EV_SYN: u16 = 0x00;
    pub const EV_KEY: u16 = 0x01;
    pub const EV_ABS: u16 = 0x03;
    pub const SYN_REPORT: u16 = 0x00;
    pub const BTN_TOUCH: u16 = 0x14a;
    pub const ABS_X: u16 = 0x00;
    pub const ABS_Y: u16 = 0x01;
    pub const ABS_PRESSURE: u16 = 0x18;
    pub const INPUT_PROP_DIRECT: u16 = 0x01;
    pub const BUS_VIRTUAL: u16 = 0x06;
    pub const VENDOR_ID: u16 = 0x1234;
    pub const PRODUCT_ID: u16 = 0x9481;
}

/// `struct input_id`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct InputId {
    bustype: u16,
    vendor: u16,
    product: u16,
    version: u16,
}

/// `struct uinput_setup`
#[repr(C)]
struct UinputSetup {
    id: InputId,
    name: [c_char; 80],
    ff_effects_max: u32,
}

/// `struct input_absinfo`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct InputAbsinfo {
    value: i32,
    minimum: i32,
    maximum: i32,
    fuzz: i32,
    flat: i32,
    resolution: i32,
}

/// `struct uinput_abs_setup`
#[repr(C)]
struct UinputAbsSetup {
    code: u16,
    absinfo: InputAbsinfo,
}

/// `struct input_event`
#[repr(C)]
struct InputEvent {
    time: libc::timeval,
    type_: u16,
    code: u16,
    value: i32,
}

const UINPUT_IOCTL_BASE: u8 = b'U';

nix::ioctl_none!(ui_dev_create, UINPUT_IOCTL_BASE, 1);
nix::ioctl_none!(ui_dev_destroy, UINPUT_IOCTL_BASE, 2);
nix::ioctl_write_ptr!(ui_dev_setup, UINPUT_IOCTL_BASE, 3, UinputSetup);
nix::ioctl_write_ptr!(ui_abs_setup, UINPUT_IOCTL_BASE, 4, UinputAbsSetup);
nix::ioctl_write_int!(ui_set_evbit, UINPUT_IOCTL_BASE, 100);
nix::ioctl_write_int!(ui_set_keybit, UINPUT_IOCTL_BASE, 101);
nix::ioctl_write_int!(ui_set_absbit, UINPUT_IOCTL_BASE, 103);
nix::ioctl_write_int!(ui_set_propbit, UINPUT_IOCTL_BASE, 110);

/// Map one pointer event to its kernel (type, code, value)
fn encode(event: PointerEvent) -> (u16, u16, i32) {
    match event {
        PointerEvent::X(x) => (code::EV_ABS, code::ABS_X, x),
        PointerEvent::Y(y) => (code::EV_ABS, code::ABS_Y, y),
        PointerEvent::Pressure(p) => (code::EV_ABS, code::ABS_PRESSURE, p),
        PointerEvent::Contact(down) => (code::EV_KEY, code::BTN_TOUCH, down as i32),
        PointerEvent::Sync => (code::EV_SYN, code::SYN_REPORT, 0),
    }
}

/// A created uinput touchscreen; destroyed on drop
pub struct UinputDevice {
    file: File,
}

impl UinputDevice {
    /// Create the device with axes `0..width` and `0..height`
    pub fn create(width: u16, height: u16) -> Result<Self, InputError> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(UINPUT)
            .map_err(|source| InputError::Open {
                path: UINPUT,
                source,
            })?;
        let fd = file.as_raw_fd();

        // SAFETY: fd is an open uinput node; every pointer refers to a live
        // value of the type the ioctl expects
        unsafe {
            for ev in [code::EV_KEY, code::EV_ABS, code::EV_SYN] {
                ui_set_evbit(fd, ev.into()).map_err(InputError::Setup)?;
            }
            ui_set_keybit(fd, code::BTN_TOUCH.into()).map_err(InputError::Setup)?;
            ui_set_propbit(fd, code::INPUT_PROP_DIRECT.into()).map_err(InputError::Setup)?;

            for (axis, max, fuzz, resolution) in [
                (code::ABS_X, width as i32 - 1, AXIS_FUZZ, width as i32),
                (code::ABS_Y, height as i32 - 1, AXIS_FUZZ, height as i32),
                (code::ABS_PRESSURE, 255, 0, 0),
            ] {
                ui_set_absbit(fd, axis.into()).map_err(InputError::Setup)?;
                let abs = UinputAbsSetup {
                    code: axis,
                    absinfo: InputAbsinfo {
                        minimum: 0,
                        maximum: max,
                        fuzz,
                        resolution,
                        ..Default::default()
                    },
                };
                ui_abs_setup(fd, &abs).map_err(InputError::Setup)?;
            }

            let mut setup = UinputSetup {
                id: InputId {
                    bustype: code::BUS_VIRTUAL,
                    vendor: code::VENDOR_ID,
                    product: code::PRODUCT_ID,
                    version: 1,
                },
                name: [0; 80],
                ff_effects_max: 0,
            };
            for (dst, &src) in setup.name.iter_mut().zip(DEVICE_NAME.as_bytes()) {
                *dst = src as c_char;
            }
            ui_dev_setup(fd, &setup).map_err(InputError::Setup)?;
            ui_dev_create(fd).map_err(InputError::Create)?;
        }

        thread::sleep(SETTLE);
        info!("Virtual pointer '{}' created ({}x{})", DEVICE_NAME, width, height);
        Ok(Self { file })
    }
}

impl EventSink for UinputDevice {
    type Error = InputError;

    fn emit(&mut self, events: &[PointerEvent]) -> Result<(), InputError> {
        let mut bytes = Vec::with_capacity(events.len() * std::mem::size_of::<InputEvent>());
        for &event in events {
            let (type_, event_code, value) = encode(event);
            let raw = InputEvent {
                time: libc::timeval {
                    tv_sec: 0,
                    tv_usec: 0,
                },
                type_,
                code: event_code,
                value,
            };
            // SAFETY: InputEvent is repr(C) plain data; the slice covers
            // exactly one value and does not outlive it
            let view = unsafe {
                std::slice::from_raw_parts(
                    (&raw as *const InputEvent).cast::<u8>(),
                    std::mem::size_of::<InputEvent>(),
                )
            };
            bytes.extend_from_slice(view);
        }
        self.file.write_all(&bytes).map_err(InputError::Write)
    }
}

impl Drop for UinputDevice {
    fn drop(&mut self) {
        // SAFETY: the fd stays open until self.file drops after this
        if let Err(e) = unsafe { ui_dev_destroy(self.file.as_raw_fd()) } {
            warn!("uinput destroy failed: {}", e);
        } else {
            debug!("Virtual pointer destroyed");
        }
    }
}
