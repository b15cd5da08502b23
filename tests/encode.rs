use unsp_asm::isa::{ALL_ALU_OPS, ALL_REGISTERS};
use unsp_asm::{AluOp, AsmConfig, Assembler, Word, SCRATCH};

fn session_at(origin: u32) -> Assembler {
    let mut asm = Assembler::new(AsmConfig::default());
    asm.set_origin(origin).unwrap();
    asm
}

#[test]
fn set_encodes_load_immediate_for_every_register() {
    for r in ALL_REGISTERS {
        for v in [0u16, 1, 0x1234, 0x8000, 0xFFFF] {
            let mut asm = session_at(0x1000);
            asm.emit_set(r, v).unwrap();
            assert_eq!(asm.here(), 0x1002);

            let w = Word(asm.mem.word(0x1000));
            assert_eq!(w.op0(), AluOp::Load.code());
            assert_eq!(w.op1(), 4);
            assert_eq!(w.op_n(), 1);
            assert_eq!(w.op_a(), r.index());
            assert_eq!(w.op_b(), r.index());
            assert_eq!(asm.mem.word(0x1001), v);
        }
    }
}

#[test]
fn load_encodes_absolute_address_literal() {
    for r in ALL_REGISTERS {
        for addr in [0u16, 1, 0x3d01, 0xFFFF] {
            let mut asm = session_at(0x2000);
            asm.emit_load(r, addr).unwrap();
            assert_eq!(asm.here(), 0x2002);

            let w = Word(asm.mem.word(0x2000));
            assert_eq!(w.op0(), AluOp::Load.code());
            assert_eq!(w.op1(), 4);
            assert_eq!(w.op_n(), 2);
            assert_eq!(w.op_a(), r.index());
            assert_eq!(w.op_b(), r.index());
            assert_eq!(asm.mem.word(0x2001), addr);
        }
    }
}

#[test]
fn store_encodes_absolute_address_literal() {
    for r in ALL_REGISTERS {
        for addr in [0u16, 0x2b00, 0xFFFF] {
            let mut asm = session_at(0x2000);
            asm.emit_store(addr, r).unwrap();
            assert_eq!(asm.here(), 0x2002);

            let w = Word(asm.mem.word(0x2000));
            assert_eq!(w.op0(), AluOp::Store.code());
            assert_eq!(w.op1(), 4);
            assert_eq!(w.op_n(), 3);
            assert_eq!(w.op_a(), r.index());
            assert_eq!(w.op_b(), r.index());
            assert_eq!(asm.mem.word(0x2001), addr);
        }
    }
}

#[test]
fn alu_is_a_single_word_over_all_codes_and_register_pairs() {
    for op in ALL_ALU_OPS {
        for ra in ALL_REGISTERS {
            for rb in ALL_REGISTERS {
                let mut asm = session_at(0x100);
                asm.emit_alu(op, ra, rb).unwrap();
                assert_eq!(asm.here(), 0x101, "no trailing literal");

                let w = Word(asm.mem.word(0x100));
                assert_eq!(w.op0(), op.code());
                assert_eq!(w.op1(), 4);
                assert_eq!(w.op_n(), 0);
                assert_eq!(w.op_a(), ra.index());
                assert_eq!(w.op_b(), rb.index());
                assert_eq!(asm.mem.word(0x101), 0);
            }
        }
    }
}

#[test]
fn store_immediate_is_set_then_store_through_scratch() {
    let mut asm = session_at(0x400);
    asm.store_immediate(0x2842, 0x0001).unwrap();
    assert_eq!(asm.here(), 0x404);

    let set = Word(asm.mem.word(0x400));
    assert_eq!(set.op0(), AluOp::Load.code());
    assert_eq!(set.op_n(), 1);
    assert_eq!(set.op_a(), SCRATCH.index());
    assert_eq!(asm.mem.word(0x401), 0x0001);

    let store = Word(asm.mem.word(0x402));
    assert_eq!(store.op0(), AluOp::Store.code());
    assert_eq!(store.op_n(), 3);
    assert_eq!(store.op_a(), SCRATCH.index());
    assert_eq!(store.op_b(), SCRATCH.index());
    assert_eq!(asm.mem.word(0x403), 0x2842);
}
