//! Whole-system scenarios: CPU, PPU, APU and cartridge wired together
//! through the console, driven by small hand-assembled programs.

use famicore_core::{Bus, Console, Status};

/// Build an NROM image: 16 KiB PRG (mirrored to $C000), 8 KiB CHR.
///
/// `program` lands at $8000, `handler` at $9000. Vectors: NMI and IRQ
/// both point at the handler, reset at $8000.
fn nrom_image(program: &[u8], handler: &[u8], chr_fill: u8) -> Vec<u8> {
    let mut prg = vec![0xEA_u8; 16 * 1024];
    prg[..program.len()].copy_from_slice(program);
    prg[0x1000..0x1000 + handler.len()].copy_from_slice(handler);
    prg[0x3FFA] = 0x00; // NMI -> $9000
    prg[0x3FFB] = 0x90;
    prg[0x3FFC] = 0x00; // reset -> $8000
    prg[0x3FFD] = 0x80;
    prg[0x3FFE] = 0x00; // IRQ -> $9000
    prg[0x3FFF] = 0x90;

    let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0];
    image.extend_from_slice(&[0; 8]);
    image.extend_from_slice(&prg);
    image.extend(std::iter::repeat(chr_fill).take(8 * 1024));
    image
}

/// MMC1 image: eight 16 KiB PRG banks, each filled with its own index.
fn mmc1_image() -> Vec<u8> {
    let mut image = vec![b'N', b'E', b'S', 0x1A, 8, 1, 0x10, 0];
    image.extend_from_slice(&[0; 8]);
    for bank in 0..8_u8 {
        image.extend(std::iter::repeat(bank).take(16 * 1024));
    }
    image.extend(std::iter::repeat(0).take(8 * 1024));
    image
}

fn boot(image: &[u8]) -> Console {
    let mut console = Console::new();
    console.load_rom(image).expect("image should load");
    console.reset();
    console
}

#[test]
fn reset_boots_into_a_jmp_loop() {
    // JMP $8000 parked at the reset target.
    let console_image = nrom_image(&[0x4C, 0x00, 0x80], &[0x40], 0);
    let mut console = boot(&console_image);

    assert_eq!(console.cpu().pc, 0x8000);
    assert_eq!(console.cpu().sp, 0xFD);
    assert!(console.cpu().status.contains(Status::I));

    let cycles = console.step();
    assert_eq!(cycles, 3);
    assert_eq!(console.cpu().pc, 0x8000);
}

#[test]
fn vblank_nmi_reaches_the_handler() {
    // LDA #$80; STA $2000; loop: JMP loop
    let program = [0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80];
    // INC $00; RTI
    let handler = [0xE6, 0x00, 0x40];
    let mut console = boot(&nrom_image(&program, &handler, 0));

    console.run_frame();
    console.run_frame();

    let nmi_count = console.bus().peek(0x0000);
    assert!(nmi_count >= 1, "NMI handler never ran");
    assert!(nmi_count <= 2, "NMI fired more than once per frame");
}

#[test]
fn nmi_disabled_means_no_handler_runs() {
    let program = [0x4C, 0x00, 0x80];
    let handler = [0xE6, 0x00, 0x40];
    let mut console = boot(&nrom_image(&program, &handler, 0));

    console.run_frame();
    assert_eq!(console.bus().peek(0x0000), 0);
}

#[test]
fn apu_frame_irq_reaches_the_handler() {
    // CLI; loop: JMP loop
    let program = [0x58, 0x4C, 0x01, 0x80];
    // LDA $4015 (acknowledges the IRQ); INC $01; RTI
    let handler = [0xAD, 0x15, 0x40, 0xE6, 0x01, 0x40];
    let mut console = boot(&nrom_image(&program, &handler, 0));

    console.run_frame();
    let irq_count = console.bus().peek(0x0001);
    assert!(irq_count >= 1, "frame IRQ never serviced");
}

#[test]
fn irq_stays_masked_while_i_is_set() {
    // Never executes CLI; I stays set from reset.
    let program = [0x4C, 0x00, 0x80];
    let handler = [0xE6, 0x01, 0x40];
    let mut console = boot(&nrom_image(&program, &handler, 0));

    console.run_frame();
    assert_eq!(console.bus().peek(0x0001), 0);
}

#[test]
fn ppudata_round_trip_with_increment_modes() {
    let image = nrom_image(&[0x4C, 0x00, 0x80], &[0x40], 0);
    let mut console = boot(&image);
    let bus = console.bus_mut();

    // Increment-by-1: two writes land at $2400, $2401.
    bus.write(0x2000, 0x00);
    bus.write(0x2006, 0x24);
    bus.write(0x2006, 0x00);
    bus.write(0x2007, 0x11);
    bus.write(0x2007, 0x22);

    bus.write(0x2006, 0x24);
    bus.write(0x2006, 0x00);
    let _ = bus.read(0x2007); // prime the buffer
    assert_eq!(bus.read(0x2007), 0x11);
    assert_eq!(bus.read(0x2007), 0x22);

    // Increment-by-32: writes step a full row.
    bus.write(0x2000, 0x04);
    bus.write(0x2006, 0x28);
    bus.write(0x2006, 0x00);
    bus.write(0x2007, 0x33);
    bus.write(0x2007, 0x44);

    bus.write(0x2006, 0x28);
    bus.write(0x2006, 0x20);
    let _ = bus.read(0x2007);
    assert_eq!(bus.read(0x2007), 0x44);
}

#[test]
fn status_read_clears_write_toggle() {
    let image = nrom_image(&[0x4C, 0x00, 0x80], &[0x40], 0);
    let mut console = boot(&image);
    let bus = console.bus_mut();

    // One $2006 write leaves the toggle half way; $2002 resets it, so
    // the next pair addresses normally.
    bus.write(0x2006, 0x3F);
    let _ = bus.read(0x2002);
    bus.write(0x2006, 0x24);
    bus.write(0x2006, 0x00);
    bus.write(0x2007, 0x55);

    bus.write(0x2006, 0x24);
    bus.write(0x2006, 0x00);
    let _ = bus.read(0x2007);
    assert_eq!(bus.read(0x2007), 0x55);
}

#[test]
fn palette_aliases_read_identically() {
    let image = nrom_image(&[0x4C, 0x00, 0x80], &[0x40], 0);
    let mut console = boot(&image);
    let bus = console.bus_mut();

    for (alias, base) in [(0x3F10_u16, 0x3F00_u16), (0x3F14, 0x3F04), (0x3F18, 0x3F08)] {
        bus.write(0x2006, (alias >> 8) as u8);
        bus.write(0x2006, (alias & 0xFF) as u8);
        bus.write(0x2007, 0x2C);

        bus.write(0x2006, (base >> 8) as u8);
        bus.write(0x2006, (base & 0xFF) as u8);
        assert_eq!(bus.read(0x2007) & 0x3F, 0x2C);
    }
}

#[test]
fn mmc1_default_banks_through_the_bus() {
    let mut console = boot(&mmc1_image());
    let bus = console.bus_mut();

    assert_eq!(bus.read(0x8000), 0); // switchable bank defaults to 0
    assert_eq!(bus.read(0xC000), 7); // last bank fixed in PRG mode 3
}

#[test]
fn mmc1_32k_mode_through_the_bus() {
    let mut console = boot(&mmc1_image());
    let bus = console.bus_mut();

    // Serially write control = 0 (32 KiB mode), then PRG bank = 3.
    for bit in 0..5 {
        bus.write(0x8000, (0x00 >> bit) & 1);
    }
    for bit in 0..5 {
        bus.write(0xE000, (0x03 >> bit) & 1);
    }

    assert_eq!(bus.read(0x8000), 2);
    assert_eq!(bus.read(0xC000), 3);
}

#[test]
fn oam_dma_runs_between_instructions() {
    // LDA #$02; STA $4014; loop: JMP loop
    let program = [0xA9, 0x02, 0x8D, 0x14, 0x40, 0x4C, 0x05, 0x80];
    let mut console = boot(&nrom_image(&program, &[0x40], 0));

    // Stage a recognizable page at $0200.
    for i in 0..256_u16 {
        console.bus_mut().write(0x0200 + i, i as u8);
    }

    console.step(); // LDA
    console.step(); // STA $4014 latches the page
    assert!(console.bus().dma_pending());

    let stall = console.step();
    assert!(stall == 513 || stall == 514, "stall = {stall}");
    for i in 0..256_usize {
        assert_eq!(console.bus().ppu.oam()[i], i as u8);
    }
}

#[test]
fn controllers_shift_through_the_bus() {
    let image = nrom_image(&[0x4C, 0x00, 0x80], &[0x40], 0);
    let mut console = boot(&image);
    console.set_input(0b0000_1001, 0b1000_0000); // P1: A+Start, P2: Right

    let bus = console.bus_mut();
    bus.write(0x4016, 1);
    bus.write(0x4016, 0);

    let p1: Vec<u8> = (0..8).map(|_| bus.read(0x4016) & 1).collect();
    assert_eq!(p1, vec![1, 0, 0, 1, 0, 0, 0, 0]);

    let p2: Vec<u8> = (0..8).map(|_| bus.read(0x4017) & 1).collect();
    assert_eq!(p2, vec![0, 0, 0, 0, 0, 0, 0, 1]);

    // Exhausted registers return 1s.
    assert_eq!(bus.read(0x4016) & 1, 1);
}

#[test]
fn frame_cycle_budget_is_ntsc_shaped() {
    let image = nrom_image(&[0x4C, 0x00, 0x80], &[0x40], 0);
    let mut console = boot(&image);

    console.run_frame();
    let first = console.cycles();
    assert!((29_000..30_600).contains(&first), "frame 1: {first}");

    console.run_frame();
    let second = console.cycles() - first;
    assert!((29_000..30_600).contains(&second), "frame 2: {second}");
}

#[test]
fn rendering_paints_the_framebuffer() {
    // Enable the background with the left column shown. CHR fill 0xFF
    // makes every pattern pixel color 3, so the whole frame resolves
    // through palette entry $3F03 (still zero) to master color $00 --
    // grey, not the black the framebuffer starts as.
    let program = [
        0xA9, 0x0A, // LDA #$0A
        0x8D, 0x01, 0x20, // STA $2001
        0x4C, 0x05, 0x80, // loop: JMP loop
    ];
    let mut console = boot(&nrom_image(&program, &[0x40], 0xFF));

    console.run_frame();
    console.run_frame();

    let fb = console.framebuffer();
    assert_eq!(fb.len(), 256 * 240);
    let blacks = fb.iter().filter(|&&px| px == 0xFF00_0000).count();
    assert!(blacks < fb.len(), "nothing was rendered");
}
