use chip16::{Opcode, Vm};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Assembles instruction words into a big-endian program image
fn assemble(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn nop(c: &mut Criterion) {
    let mut vm = Vm::seeded(0);
    let o = Opcode::new(0);
    c.bench_function("nop", |b| b.iter(|| vm.eval(black_box(o))));
}

/// Counts `R0` down from 10000, accumulating into `R1`
fn alu_loop(c: &mut Criterion) {
    let rom = assemble(&[
        0x2000_1027, // LDI R0, 10000
        0x2001_0000, // LDI R1, 0
        0x4101_0000, // ADD R1, R0
        0x5000_0100, // SUBI R0, 1
        0x1201_0800, // JNZ 0x0008
        0x1000_1400, // JMP 0x0014
    ]);
    c.bench_function("alu_loop", |b| {
        b.iter(|| {
            let mut vm = Vm::seeded(0);
            vm.load(&rom, 0).unwrap();
            while vm.state().pc != 0x14 {
                vm.step().unwrap();
            }
            black_box(vm.state().regs[1])
        })
    });
}

fn sprite(c: &mut Criterion) {
    let mut vm = Vm::seeded(0);
    let data: Vec<u8> = (0..128).map(|i| i as u8).collect();
    vm.state_mut().ram[0x1000..0x1080].copy_from_slice(&data);
    vm.eval(Opcode::new(0x0400_0810)).unwrap(); // SPR 8 bytes x 16 rows
    assert_eq!(vm.graphics().sprite_size(), (8, 16));
    vm.state_mut().regs[0] = 100;
    vm.state_mut().regs[1] = 100;
    let o = Opcode::new(0x0510_0010); // DRW R0, R1, 0x1000
    c.bench_function("sprite_16x16", |b| b.iter(|| vm.eval(black_box(o))));
}

criterion_group!(benches, nop, alu_loop, sprite);
criterion_main!(benches);
