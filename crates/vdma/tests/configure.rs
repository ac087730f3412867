//! Channel configuration: geometry, frame-store addresses, genlock fields and
//! the order in which the hardware is programmed.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use vdma::hal::{
    IXR_ERROR_MASK, IXR_FRMCNT_MASK, S2MM_IRQ_ERR_ALL_MASK, SR_ERR_ALL_MASK,
};
use vdma::mocks::{HalCall, HalFailure, MockInterruptController, MockVdmaHal};
use vdma::{
    validate_topology, ConfigError, ConfigStep, Direction, HwConfig, IrqId, StartError, Vdma,
    VdmaError,
};

fn driver(base: u32, config: HwConfig) -> Vdma<'static, MockVdmaHal> {
    let mut intc = MockInterruptController::new();
    let mut vdma = Vdma::new(
        MockVdmaHal::new(config),
        config.device_id,
        base,
        &mut intc,
        IrqId(61),
        IrqId(62),
    )
    .unwrap();
    vdma.hal_mut().clear_calls();
    vdma
}

#[test]
fn vga_read_ring_from_base() {
    let mut vdma = driver(0x1000, MockVdmaHal::default_config(0));
    vdma.configure_read(640, 480, 0).unwrap();

    assert_eq!(
        vdma.hal().buffer_addresses(Direction::Read),
        &[0x1000, 0x12_D000, 0x25_9000, 0x38_5000]
    );
    let cfg = vdma.read_config().unwrap();
    assert_eq!(cfg.horizontal_size_input, 2560);
    assert_eq!(cfg.vertical_size_input, 480);
    assert_eq!(cfg.stride, 2560);
    assert_eq!(cfg.frame_delay, 2);
    assert!(cfg.enable_sync);
    assert_eq!(
        cfg.frame_store_addresses.as_slice(),
        vdma.hal().buffer_addresses(Direction::Read)
    );
}

#[test]
fn read_programming_order() {
    let mut vdma = driver(0, MockVdmaHal::default_config(0));
    vdma.configure_read(640, 480, 0).unwrap();

    let dir = Direction::Read;
    assert_eq!(
        vdma.hal().calls(),
        &[
            HalCall::DmaConfig(dir),
            HalCall::SetBufferAddresses {
                direction: dir,
                count: 4
            },
            HalCall::SetFrameStoreCount {
                direction: dir,
                count: 4
            },
            HalCall::ClearErrors {
                direction: dir,
                mask: SR_ERR_ALL_MASK
            },
            HalCall::InterruptEnable {
                direction: dir,
                mask: IXR_ERROR_MASK | IXR_FRMCNT_MASK
            },
        ]
    );
}

#[test]
fn write_clears_errors_first_and_unmasks_s2mm_errors() {
    let mut vdma = driver(0, MockVdmaHal::default_config(0));
    vdma.configure_write(640, 480, 640, 480, 0, true).unwrap();

    let dir = Direction::Write;
    assert_eq!(
        vdma.hal().calls(),
        &[
            HalCall::ClearErrors {
                direction: dir,
                mask: SR_ERR_ALL_MASK
            },
            HalCall::DmaConfig(dir),
            HalCall::SetBufferAddresses {
                direction: dir,
                count: 4
            },
            HalCall::SetFrameStoreCount {
                direction: dir,
                count: 4
            },
            HalCall::ClearErrors {
                direction: dir,
                mask: SR_ERR_ALL_MASK
            },
            HalCall::MaskS2mmErrors {
                direction: dir,
                mask: !S2MM_IRQ_ERR_ALL_MASK
            },
            HalCall::InterruptEnable {
                direction: dir,
                mask: IXR_ERROR_MASK | IXR_FRMCNT_MASK
            },
        ]
    );
}

#[test]
fn write_window_inside_larger_framebuffer() {
    let config = HwConfig {
        s2mm_stream_width: 3,
        ..MockVdmaHal::default_config(0)
    };
    let mut vdma = driver(0x2000_0000, config);
    vdma.configure_write(640, 480, 1920, 1080, 0, false).unwrap();

    let cfg = vdma.write_config().unwrap();
    assert_eq!(cfg.horizontal_size_input, 640 * 3);
    assert_eq!(cfg.stride, 1920 * 3);
    assert_eq!(cfg.full_vertical_resolution, 1080);

    let slot = 1920 * 3 * 1080;
    let addrs = vdma.hal().buffer_addresses(Direction::Write);
    assert_eq!(addrs[0], 0x2000_0000);
    assert_eq!(addrs[3], 0x2000_0000 + 3 * slot);
}

#[test]
fn master_write_free_runs_and_slave_follows() {
    let mut master = driver(0, MockVdmaHal::default_config(0));
    master.configure_write(1280, 720, 1280, 720, 0, true).unwrap();
    let master_cfg = master.write_config().unwrap();
    assert!(master_cfg.is_master());
    assert!(!master_cfg.enable_sync);
    assert!(master_cfg.enable_circular_buffer);

    let mut slave = driver(0, MockVdmaHal::default_config(1));
    slave.configure_write(1280, 720, 1280, 720, 0, false).unwrap();
    let slave_cfg = slave.write_config().unwrap();
    assert!(slave_cfg.enable_sync);
    assert_eq!(slave_cfg.frame_delay, 0);
    assert_eq!(slave_cfg.point_num, master_cfg.point_num);
}

#[test]
fn configured_channels_form_a_valid_topology() {
    let mut capture = driver(0x1000_0000, MockVdmaHal::default_config(0));
    capture.configure_write(1280, 720, 1280, 720, 0, true).unwrap();
    capture.configure_read(1280, 720, 0).unwrap();

    let mut scaler = driver(0x1000_0000, MockVdmaHal::default_config(1));
    scaler.configure_write(1280, 720, 1280, 720, 0, false).unwrap();

    let channels = [
        capture.write_config().unwrap(),
        capture.read_config().unwrap(),
        scaler.write_config().unwrap(),
    ];
    assert_eq!(validate_topology(&channels, capture.max_frame_slots()), Ok(()));
}

#[test]
fn submitted_config_carries_fixed_descriptor_fields() {
    let mut vdma = driver(0, MockVdmaHal::default_config(0));
    vdma.configure_read(320, 240, 1).unwrap();

    let submitted = vdma.hal().submitted_config(Direction::Read).unwrap();
    assert!(!submitted.enable_frame_counter);
    assert_eq!(submitted.fixed_frame_store_addr, 0);
    assert!(submitted.genlock_repeat);
    assert_eq!(submitted.point_num, 1);
}

#[test]
fn each_failing_step_is_reported() {
    let cases = [
        (HalFailure::DmaConfig(Direction::Read), ConfigStep::DmaConfig),
        (
            HalFailure::BufferAddresses(Direction::Read),
            ConfigStep::BufferAddresses,
        ),
        (
            HalFailure::FrameStoreCount(Direction::Read),
            ConfigStep::FrameStoreCount,
        ),
    ];
    for (failure, step) in cases {
        let mut vdma = driver(0, MockVdmaHal::default_config(0));
        vdma.hal_mut().fail_on(failure);
        assert_eq!(
            vdma.configure_read(640, 480, 0),
            Err(ConfigError {
                direction: Direction::Read,
                step
            })
        );
        assert!(vdma.read_config().is_none());
        // Aborted before interrupts were enabled.
        assert!(!vdma
            .hal()
            .calls()
            .iter()
            .any(|c| matches!(c, HalCall::InterruptEnable { .. })));
    }
}

#[test]
fn failed_reconfigure_drops_previous_config() {
    let mut vdma = driver(0, MockVdmaHal::default_config(0));
    vdma.configure_write(640, 480, 640, 480, 0, true).unwrap();
    assert!(vdma.write_config().is_some());

    vdma.hal_mut().fail_on(HalFailure::DmaConfig(Direction::Write));
    assert!(vdma.configure_write(640, 480, 640, 480, 0, true).is_err());
    assert!(vdma.write_config().is_none());
}

#[test]
fn absent_channel_cannot_be_configured() {
    let config = HwConfig {
        has_s2mm: false,
        ..MockVdmaHal::default_config(0)
    };
    let mut vdma = driver(0, config);
    assert_eq!(
        vdma.configure_write(640, 480, 640, 480, 0, true),
        Err(ConfigError {
            direction: Direction::Write,
            step: ConfigStep::ChannelAbsent
        })
    );
    assert!(vdma.hal().calls().is_empty());
    assert_eq!(
        vdma.enable_write(),
        Err(StartError {
            direction: Direction::Write
        })
    );
}

#[test]
fn enable_starts_the_channel() {
    let mut vdma = driver(0, MockVdmaHal::default_config(0));
    vdma.configure_read(640, 480, 0).unwrap();
    vdma.enable_read().unwrap();
    assert!(vdma.hal().is_running(Direction::Read));
    assert!(!vdma.hal().is_running(Direction::Write));
}

#[test]
fn start_rejection_is_start_error() {
    let mut vdma = driver(0, MockVdmaHal::default_config(0));
    vdma.hal_mut().fail_on(HalFailure::Start(Direction::Write));
    assert_eq!(
        vdma.enable_write(),
        Err(StartError {
            direction: Direction::Write
        })
    );
}

#[test]
fn bring_up_sequence_composes_with_question_mark() {
    fn bring_up(vdma: &mut Vdma<'_, MockVdmaHal>) -> Result<(), VdmaError> {
        vdma.reset_write()?;
        vdma.configure_write(1280, 720, 1280, 720, 0, true)?;
        vdma.enable_write()?;
        vdma.reset_read()?;
        vdma.configure_read(1280, 720, 0)?;
        vdma.enable_read()?;
        Ok(())
    }

    let mut vdma = driver(0x1000_0000, MockVdmaHal::default_config(0));
    bring_up(&mut vdma).unwrap();
    assert!(vdma.hal().is_running(Direction::Read));
    assert!(vdma.hal().is_running(Direction::Write));
    assert_eq!(vdma.hal().frame_store_count(Direction::Write), Some(4));
}

#[test]
fn short_framebuffer_is_raised_to_window_height() {
    let mut vdma = driver(0, MockVdmaHal::default_config(0));
    vdma.configure_write(640, 480, 640, 240, 0, true).unwrap();

    let cfg = vdma.write_config().unwrap();
    assert_eq!(cfg.full_vertical_resolution, 480);
    let addrs = vdma.hal().buffer_addresses(Direction::Write);
    assert_eq!(addrs[1] - addrs[0], 640 * 4 * 480);
}
