#![no_main]

use chip16::{
    op,
    state::{IO_START, STACK_START},
    Vm,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut vm = Vm::seeded(0);
    if vm.load(data, 0).is_err() {
        return;
    }

    let mut trace = vec![];
    for _ in 0..65536 {
        let pc = vm.state().pc;
        let Ok(o) = vm.step() else {
            return;
        };
        trace.push((pc, o));

        let s = vm.state();
        let mut failed = false;
        if s.pc >= STACK_START {
            println!("PC out of range: {:#06x}", s.pc);
            failed = true;
        }
        if !(STACK_START..IO_START).contains(&s.sp) {
            println!("SP out of range: {:#06x}", s.sp);
            failed = true;
        }
        if s.flags.bits() & !0b1100_0110 != 0 {
            println!("undefined flag bits: {:#04x}", s.flags.bits());
            failed = true;
        }
        if failed {
            println!("Instructions:");
            for (pc, o) in &trace {
                println!(
                    "  {pc:#06x}: {o} {}",
                    op::mnemonic(o.op()).unwrap_or("???")
                );
            }
            panic!("invariant violated");
        }
    }
});
