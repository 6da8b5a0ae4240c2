use chip16::{state::STACK_START, Error, Opcode, Vm};

/// Assembles instruction words into a big-endian program image
fn assemble(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Steps until `PC` reaches `stop`, failing after too many steps
fn run_to(vm: &mut Vm, stop: u16) -> Result<usize, Error> {
    for i in 0..100_000 {
        if vm.state().pc == stop {
            return Ok(i);
        }
        vm.step()?;
    }
    panic!("program did not reach {stop:#06x}");
}

#[test]
fn countdown_loop() {
    let mut vm = Vm::seeded(0);
    let rom = assemble(&[
        0x2000_0A00, // 0x00: LDI R0, 10
        0x2001_0000, // 0x04: LDI R1, 0
        0x4001_0300, // 0x08: ADDI R1, 3
        0x5000_0100, // 0x0C: SUBI R0, 1
        0x1201_0800, // 0x10: JNZ 0x0008
        0x1000_1400, // 0x14: JMP 0x0014
    ]);
    vm.load(&rom, 0).unwrap();
    run_to(&mut vm, 0x14).unwrap();
    assert_eq!(vm.state().regs[0], 0);
    assert_eq!(vm.state().regs[1], 30);
    assert!(vm.state().flags.zero());
}

#[test]
fn subroutine() {
    let mut vm = Vm::seeded(0);
    let rom = assemble(&[
        0x2000_0500, // 0x00: LDI R0, 5
        0x1400_1000, // 0x04: CALL 0x0010
        0x2402_0000, // 0x08: MOV R2, R0
        0x1000_0C00, // 0x0C: JMP 0x000C
        0xC000_0000, // 0x10: PUSH R0
        0x9000_0300, // 0x14: MULI R0, 3
        0xC101_0000, // 0x18: POP R1
        0x1500_0000, // 0x1C: RET
    ]);
    vm.load(&rom, 0).unwrap();

    // Stop inside the subroutine to look at the return address
    run_to(&mut vm, 0x14).unwrap();
    assert_eq!(vm.state().sp, STACK_START + 4);
    assert_eq!(vm.state().ram.read_pointer(STACK_START), Ok(0x08));

    run_to(&mut vm, 0x0C).unwrap();
    let s = vm.state();
    assert_eq!(s.regs[..3], [15, 5, 15]);
    assert_eq!(s.sp, STACK_START);
}

#[test]
fn memory_copy() {
    let mut vm = Vm::seeded(0);
    let mut rom = assemble(&[
        0x2000_0001, // 0x00: LDI R0, 0x0100 (source)
        0x2001_0002, // 0x04: LDI R1, 0x0200 (destination)
        0x2002_0400, // 0x08: LDI R2, 4 (words left)
        0x2303_0000, // 0x0C: LDM R3, R0
        0x3113_0000, // 0x10: STM R3, R1
        0x4000_0200, // 0x14: ADDI R0, 2
        0x4001_0200, // 0x18: ADDI R1, 2
        0x5002_0100, // 0x1C: SUBI R2, 1
        0x1201_0C00, // 0x20: JNZ 0x000C
        0x1000_2400, // 0x24: JMP 0x0024
    ]);
    rom.resize(0x100, 0);
    rom.extend([1, 2, 3, 4, 5, 6, 7, 8]);
    vm.load(&rom, 0).unwrap();
    run_to(&mut vm, 0x24).unwrap();
    assert_eq!(&vm.state().ram[0x200..0x208], &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn draw_with_palette() {
    let mut vm = Vm::seeded(0);
    let mut rom = assemble(&[
        0xD000_0001, // 0x00: PAL 0x0100
        0x0300_0200, // 0x04: BGC 2
        0x0400_0201, // 0x08: SPR 2x1 bytes (4x1 pixels)
        0x2000_0400, // 0x0C: LDI R0, 4
        0x2001_0800, // 0x10: LDI R1, 8
        0x0510_3001, // 0x14: DRW R0, R1, 0x0130
        0x0800_0002, // 0x18: FLIP 1, 0
        0x4001_0100, // 0x1C: ADDI R1, 1
        0x0510_3001, // 0x20: DRW R0, R1, 0x0130
        0x1000_2400, // 0x24: JMP 0x0024
    ]);
    rom.resize(0x100, 0);
    // Palette: entry i is (B, G, R) = (i, i, i)
    rom.extend((0..16).flat_map(|i| [i, i, i]));
    // Sprite
    rom.extend([0x12, 0x03]);
    vm.load(&rom, 0).unwrap();
    run_to(&mut vm, 0x24).unwrap();

    let g = vm.graphics();
    assert_eq!(g.background(), 2);
    let row: Vec<u8> = (4..8).map(|x| g.pixel(x, 8)).collect();
    assert_eq!(row, [1, 2, 0, 3]);
    let row: Vec<u8> = (4..8).map(|x| g.pixel(x, 9)).collect();
    assert_eq!(row, [3, 0, 2, 1]);
    assert!(!vm.state().flags.carry());

    // Transparent pixel shows the background
    let frame = vm.graphics_mut().frame();
    let at = |x: usize, y: usize| (x + y * 320) * 4;
    assert_eq!(&frame[at(6, 8)..][..4], &[2, 2, 2, 0xFF]);
    assert_eq!(&frame[at(7, 8)..][..4], &[3, 3, 3, 0xFF]);
}

#[test]
fn vblank_is_latched() {
    let mut vm = Vm::seeded(0);
    let rom = assemble(&[
        0x4000_0100, // 0x00: ADDI R0, 1
        0x0200_0000, // 0x04: VBLNK
        0x1000_0000, // 0x08: JMP 0x0000
    ]);
    vm.load(&rom, 0).unwrap();
    let mut frames = 0;
    for _ in 0..30 {
        vm.step().unwrap();
        if vm.graphics_mut().take_vblank() {
            frames += 1;
        }
    }
    assert_eq!(frames, 10);
    assert_eq!(vm.state().regs[0], 10);
}

#[test]
fn faults_stop_execution() {
    let mut vm = Vm::seeded(0);
    let rom = assemble(&[
        0x2000_0700, // 0x00: LDI R0, 7
        0xA100_0000, // 0x04: DIV R0, R0 (R0 / R0 = 1)
        0xA001_0000, // 0x08: DIVI R1, 0
    ]);
    vm.load(&rom, 0).unwrap();
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.state().regs[0], 1);
    assert_eq!(vm.step(), Err(Error::DivideByZero));
    assert_eq!(vm.state().pc, 0x0C);

    let mut vm = Vm::seeded(0);
    vm.load(&[0xFF, 0, 0, 0], 0).unwrap();
    assert_eq!(
        vm.step(),
        Err(Error::UnknownOpcode(Opcode::new(0xFF00_0000)))
    );
}

#[test]
fn runaway_stack() {
    let mut vm = Vm::seeded(0);
    let rom = assemble(&[
        0xC200_0000, // 0x00: PUSHALL
        0x1000_0000, // 0x04: JMP 0x0000
    ]);
    vm.load(&rom, 0).unwrap();
    let err = run_to(&mut vm, 0xFFFF).unwrap_err();
    assert!(matches!(err, Error::StackOverflow(_)));
    assert!(vm.state().sp + 32 >= chip16::state::IO_START);
}
