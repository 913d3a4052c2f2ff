use ux::{u12, u4};

use crate::chip::chip8::{config::Config, Chip8};
use crate::chip::{Chip, MachineError};

fn prepare_state_with_single_instruction(config: Config, instruction: u16) -> Chip8 {
    let mut chip8 = Chip8::with_config(config);
    chip8.memory[0x200] = ((instruction & 0xFF00) >> 8) as u8;
    chip8.memory[0x201] = (instruction & 0xFF) as u8;
    chip8
}

fn do_cycle_with_config(
    config: Config,
    instruction: u16,
    before_cycle: fn(&mut Chip8),
    after_cycle: fn(&mut Chip8),
) {
    let mut state = prepare_state_with_single_instruction(config, instruction);

    before_cycle(&mut state);
    state.step().unwrap();
    after_cycle(&mut state);
}

fn do_cycle(instruction: u16, before_cycle: fn(&mut Chip8), after_cycle: fn(&mut Chip8)) {
    do_cycle_with_config(Config::default(), instruction, before_cycle, after_cycle)
}

fn schip() -> Config {
    Config {
        schip_compatible: true,
        ..Config::default()
    }
}

#[test]
fn test_initial_state() {
    let chip8 = Chip8::new();
    assert_eq!(chip8.program_counter, 0x200);
    assert_eq!(chip8.registers, [0; 16]);
    assert_eq!(chip8.stack_pointer, 0);
    assert_eq!(chip8.memory[0..5], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
    assert_eq!(chip8.memory[75..80], [0xF0, 0x80, 0xF0, 0x80, 0x80]);
    assert!(chip8.memory[80..].iter().all(|&byte| byte == 0));
}

#[test]
fn test_clear_display() {
    do_cycle(
        0x00E0,
        |state| {
            state.output_pins[100] = true;
        },
        |state| {
            assert!(state.output_pins.iter().all(|&pixel| !pixel));
            assert!(state.draw);
            assert_eq!(state.program_counter, 0x202);
        },
    )
}

#[test]
fn test_return() {
    do_cycle(
        0x00EE,
        |state| {
            state.stack[0] = 0x346;
            state.stack_pointer = 1;
        },
        |state| {
            assert_eq!(state.program_counter, 0x346);
            assert_eq!(state.stack_pointer, 0);
        },
    )
}

#[test]
fn test_return_without_call_halts() {
    let mut state = prepare_state_with_single_instruction(Config::default(), 0x00EE);
    let error = MachineError::StackUnderflow { address: 0x200 };

    assert_eq!(state.step(), Err(error.clone()));
    assert_eq!(state.program_counter, 0x200);
    assert_eq!(state.stack_pointer, 0);

    // halted machines stay halted
    assert_eq!(state.step(), Err(error.clone()));
    assert_eq!(state.halted(), Some(&error));
}

#[test]
fn test_jump() {
    do_cycle(
        0x1CAF,
        |state| {
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0xCAF);
        },
    )
}

#[test]
fn test_call() {
    do_cycle(
        0x2CAF,
        |state| {
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0xCAF);
            assert_eq!(state.stack[(state.stack_pointer - 1) as usize], 0x202);
        },
    )
}

#[test]
fn test_call_beyond_stack_depth_halts() {
    // calls itself over and over again
    let mut state = prepare_state_with_single_instruction(Config::default(), 0x2200);

    for depth in 1..=16 {
        state.step().unwrap();
        assert_eq!(state.stack_depth(), depth);
        assert_eq!(state.program_counter, 0x200);
    }

    assert_eq!(
        state.step(),
        Err(MachineError::StackOverflow {
            address: 0x200,
            depth: 16
        })
    );
    assert_eq!(state.stack_depth(), 16);
}

#[test]
fn test_skip_if_equal() {
    do_cycle(
        0x34AF,
        |state| {
            state.registers[4] = 0xAF;
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );

    do_cycle(
        0x34BF,
        |state| {
            state.registers[4] = 0xAF;
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );
}

#[test]
fn test_skip_if_not_equal() {
    do_cycle(
        0x44AF,
        |state| {
            state.registers[4] = 0xAF;
        },
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );

    do_cycle(
        0x44BF,
        |state| {
            state.registers[4] = 0xAF;
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );
}

#[test]
fn test_skip_if_registers_equal() {
    do_cycle(
        0x5120,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );

    do_cycle(
        0x5120,
        |state| {
            state.registers[1] = 0x11;
        },
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );
}

#[test]
fn test_skip_if_registers_not_equal() {
    do_cycle(
        0x9120,
        |state| {
            state.registers[1] = 0x11;
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );

    do_cycle(
        0x9120,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );
}

#[test]
fn test_load_and_add_wrap() {
    do_cycle(
        0x6A42,
        |_| {},
        |state| {
            assert_eq!(state.registers[0xA], 0x42);
        },
    );

    do_cycle(
        0x7AF0,
        |state| {
            state.registers[0xA] = 0x20;
            state.registers[0xF] = 0x5;
        },
        |state| {
            assert_eq!(state.registers[0xA], 0x10);
            // 7XNN never touches VF
            assert_eq!(state.registers[0xF], 0x5);
        },
    );
}

#[test]
fn test_register_logic() {
    do_cycle(
        0x8120,
        |state| {
            state.registers[2] = 0x1;
        },
        |state| {
            assert_eq!(state.registers[1], 0x1);
        },
    );
    do_cycle(
        0x8121,
        |state| {
            state.registers[1] = 0x6;
            state.registers[2] = 0x3;
        },
        |state| {
            assert_eq!(state.registers[1], 0x7);
        },
    );
    do_cycle(
        0x8122,
        |state| {
            state.registers[1] = 0x6;
            state.registers[2] = 0x3;
        },
        |state| {
            assert_eq!(state.registers[1], 0x2);
        },
    );
    do_cycle(
        0x8123,
        |state| {
            state.registers[1] = 0x6;
            state.registers[2] = 0x3;
        },
        |state| {
            assert_eq!(state.registers[1], 0x5);
        },
    );
}

#[test]
fn test_add_registers_sets_carry() {
    do_cycle(
        0x8124,
        |state| {
            state.registers[1] = 0xFF;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.registers[1], 0x10);
            assert_eq!(state.registers[0xF], 0x1);
        },
    );
}

// Known quirk: the carry/borrow paths only ever set VF, they never clear it.
#[test]
fn test_add_registers_without_carry_keeps_flag() {
    do_cycle(
        0x8124,
        |state| {
            state.registers[1] = 0xEE;
            state.registers[2] = 0x11;
            state.registers[0xF] = 0x7;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFF);
            assert_eq!(state.registers[0xF], 0x7);
        },
    );
}

#[test]
fn test_sub_registers() {
    do_cycle(
        0x8125,
        |state| {
            state.registers[1] = 0x33;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.registers[1], 0x22);
            assert_eq!(state.registers[0xF], 0x1);
        },
    );

    // borrow: VF keeps its previous value
    do_cycle(
        0x8125,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x12;
            state.registers[0xF] = 0x0;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFF);
            assert_eq!(state.registers[0xF], 0x0);
        },
    );
    do_cycle(
        0x8125,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x12;
            state.registers[0xF] = 0x1;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFF);
            assert_eq!(state.registers[0xF], 0x1);
        },
    );
}

#[test]
fn test_reverse_sub_registers() {
    do_cycle(
        0x8127,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x33;
        },
        |state| {
            assert_eq!(state.registers[1], 0x22);
            assert_eq!(state.registers[0xF], 0x1);
        },
    );

    do_cycle(
        0x8127,
        |state| {
            state.registers[1] = 0x12;
            state.registers[2] = 0x11;
            state.registers[0xF] = 0x3;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFF);
            assert_eq!(state.registers[0xF], 0x3);
        },
    );
}

#[test]
fn test_equal_operands_do_not_borrow() {
    do_cycle(
        0x8125,
        |state| {
            state.registers[1] = 0x42;
            state.registers[2] = 0x42;
        },
        |state| {
            assert_eq!(state.registers[1], 0x0);
            assert_eq!(state.registers[0xF], 0x1);
        },
    );
}

#[test]
fn test_shift_right_uses_vy() {
    do_cycle(
        0x8126,
        |state| {
            state.registers[1] = 0x4;
            state.registers[2] = 0x9;
        },
        |state| {
            assert_eq!(state.registers[1], 0x4);
            assert_eq!(state.registers[2], 0x9);
            assert_eq!(state.registers[0xF], 0x1);
        },
    );
}

#[test]
fn test_shift_right_uses_vx_when_schip_compatible() {
    do_cycle_with_config(
        schip(),
        0x8126,
        |state| {
            state.registers[1] = 0x4;
            state.registers[2] = 0x9;
        },
        |state| {
            assert_eq!(state.registers[1], 0x2);
            assert_eq!(state.registers[0xF], 0x0);
        },
    );
}

#[test]
fn test_shift_left_uses_vy() {
    do_cycle(
        0x812E,
        |state| {
            state.registers[1] = 0x01;
            state.registers[2] = 0xFF;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFE);
            assert_eq!(state.registers[0xF], 0x1);
        },
    );
}

#[test]
fn test_shift_left_uses_vx_when_schip_compatible() {
    do_cycle_with_config(
        schip(),
        0x812E,
        |state| {
            state.registers[1] = 0x04;
            state.registers[2] = 0xFF;
            state.registers[0xF] = 0x1;
        },
        |state| {
            assert_eq!(state.registers[1], 0x08);
            assert_eq!(state.registers[0xF], 0x0);
        },
    );
}

#[test]
fn test_shift_into_flag_register_keeps_result() {
    do_cycle(
        0x8F16,
        |state| {
            state.registers[1] = 0x7;
        },
        |state| {
            assert_eq!(state.registers[0xF], 0x3);
        },
    );
}

#[test]
fn test_load_index() {
    do_cycle(
        0xAABC,
        |_| {},
        |state| {
            assert_eq!(state.index, 0xABC);
        },
    );
}

#[test]
fn test_jump_with_offset() {
    do_cycle(
        0xBABC,
        |state| {
            state.registers[0] = 0x2;
        },
        |state| {
            assert_eq!(state.program_counter, 0xABE);
        },
    );

    do_cycle(
        0xBFFF,
        |state| {
            state.registers[0] = 0x3;
        },
        |state| {
            assert_eq!(state.program_counter, 0x002);
        },
    );
}

#[test]
fn test_random_is_masked() {
    do_cycle(
        0xC300,
        |state| {
            state.registers[3] = 0xAA;
        },
        |state| {
            assert_eq!(state.registers[3], 0x0);
        },
    );

    for _ in 0..32 {
        do_cycle(
            0xC30F,
            |_| {},
            |state| {
                assert!(state.registers[3] <= 0x0F);
                assert_eq!(state.program_counter, 0x202);
            },
        );
    }
}

#[test]
fn test_draw_glyph() {
    do_cycle(
        0xD015,
        |state| {
            state.registers[0] = 1;
            state.registers[1] = 2;
            state.registers[0xF] = 1;
        },
        |state| {
            // glyph 0 is at index 0
            let row = |y: usize| -> Vec<bool> { state.output_pins[y * 64 + 1..y * 64 + 5].to_vec() };
            assert_eq!(row(2), vec![true, true, true, true]);
            assert_eq!(row(3), vec![true, false, false, true]);
            assert_eq!(row(6), vec![true, true, true, true]);
            assert_eq!(state.registers[0xF], 0);
            assert!(state.draw);
        },
    );
}

#[test]
fn test_draw_reports_collision() {
    do_cycle(
        0xD001,
        |state| {
            state.output_pins[0] = true;
        },
        |state| {
            assert!(!state.output_pins[0]);
            assert_eq!(state.registers[0xF], 1);
        },
    );
}

#[test]
fn test_draw_twice_restores_display() {
    let mut state = Chip8::new();
    // draw glyph 8 twice at (60, 30) to exercise wrapping as well
    let program: [u8; 12] = [0x60, 0x3C, 0x61, 0x1E, 0x62, 0x08, 0xF2, 0x29, 0xD0, 0x15, 0xD0, 0x15];
    state.load_program_bytes(&program);

    for _ in 0..5 {
        state.step().unwrap();
    }
    assert_eq!(state.registers[0xF], 0);
    let drawn = state.output_pins.iter().filter(|&&pixel| pixel).count();
    assert_eq!(drawn, 4 + 2 + 4 + 2 + 4);

    state.step().unwrap();
    assert_eq!(state.registers[0xF], 1);
    assert!(state.output_pins.iter().all(|&pixel| !pixel));
}

#[test]
fn test_skip_if_key_pressed() {
    do_cycle(
        0xE19E,
        |state| {
            state.registers[1] = 0xE;
            state.set_input_pin(u4::new(0xE), true);
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );

    do_cycle(
        0xE19E,
        |state| {
            state.registers[1] = 0xE;
        },
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );
}

#[test]
fn test_skip_if_key_not_pressed() {
    do_cycle(
        0xE1A1,
        |state| {
            state.registers[1] = 0xE;
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );

    do_cycle(
        0xE1A1,
        |state| {
            state.registers[1] = 0xE;
            state.set_input_pin(u4::new(0xE), true);
        },
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );

    // there is no key 0x10, so it is never pressed
    do_cycle(
        0xE1A1,
        |state| {
            state.registers[1] = 0x10;
            state.set_input_pin(u4::new(0x0), true);
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );
}

#[test]
fn test_timer_registers() {
    do_cycle(
        0xF107,
        |state| {
            state.timers.set_delay(0xF);
        },
        |state| {
            assert_eq!(state.registers[1], 0xF);
        },
    );

    do_cycle(
        0xF115,
        |state| {
            state.registers[1] = 0xF;
        },
        |state| {
            assert_eq!(state.timers.delay(), 0xF);
        },
    );

    do_cycle(
        0xF118,
        |state| {
            state.registers[1] = 0xF;
        },
        |state| {
            assert_eq!(state.timers.sound(), 0xF);
        },
    );
}

#[test]
fn test_step_does_not_tick_timers() {
    let mut state = prepare_state_with_single_instruction(Config::default(), 0x1200);
    state.timers.set_delay(10);

    for _ in 0..100 {
        state.step().unwrap();
    }
    assert_eq!(state.timers.delay(), 10);

    for _ in 0..10 {
        state.tick_timers();
    }
    assert_eq!(state.timers.delay(), 0);
}

#[test]
fn test_wait_for_key() {
    let mut state = prepare_state_with_single_instruction(Config::default(), 0xF30A);
    state.step().unwrap();
    assert!(state.is_waiting_for_key());
    assert_eq!(state.program_counter, 0x202);

    // no progress while waiting
    state.step().unwrap();
    assert_eq!(state.program_counter, 0x202);

    // releasing keys does not end the wait
    state.set_input_pin(u4::new(0x7), false);
    state.reset_input_pins();
    assert!(state.is_waiting_for_key());

    state.set_input_pin(u4::new(0xB), true);
    assert!(!state.is_waiting_for_key());
    assert_eq!(state.registers[3], 0xB);
    assert!(state.input_pins[0xB]);
}

#[test]
fn test_add_to_index_wraps() {
    do_cycle(
        0xF11E,
        |state| {
            state.index = 0x1;
            state.registers[1] = 0x1;
        },
        |state| {
            assert_eq!(state.index, 0x2);
        },
    );

    do_cycle(
        0xF11E,
        |state| {
            state.index = 0xFFF;
            state.registers[1] = 0x2;
        },
        |state| {
            assert_eq!(state.index, 0x001);
        },
    );
}

#[test]
fn test_load_glyph_address() {
    do_cycle(
        0xF129,
        |state| {
            state.registers[1] = 0x2;
        },
        |state| {
            assert_eq!(state.index, 0xA);
        },
    );

    do_cycle(
        0xF129,
        |state| {
            state.registers[1] = 0x1F;
        },
        |state| {
            assert_eq!(state.index, 0x4B);
        },
    );
}

#[test]
fn test_store_bcd() {
    do_cycle(
        0xF133,
        |state| {
            state.registers[1] = 123;
            state.index = 0x300;
        },
        |state| {
            assert_eq!(state.memory[0x300..0x303], [0x1, 0x2, 0x3]);
            assert_eq!(state.index, 0x300);
        },
    );

    do_cycle(
        0xF133,
        |state| {
            state.registers[1] = 7;
            state.index = 0xFFE;
        },
        |state| {
            assert_eq!(state.memory[0xFFE..], [0x0, 0x0]);
            assert_eq!(state.memory[0x000], 0x7);
        },
    );
}

#[test]
fn test_store_registers() {
    do_cycle(
        0xF455,
        |state| {
            state.index = 0x300;
            state.registers[0x0..0x6].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5, 0x6]);
        },
        |state| {
            assert_eq!(state.memory[0x300..0x306], [0x1, 0x2, 0x3, 0x4, 0x5, 0x0]);
            assert_eq!(state.index, 0x305);
        },
    );

    do_cycle_with_config(
        schip(),
        0xF455,
        |state| {
            state.index = 0x300;
            state.registers[0x0..0x5].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5]);
        },
        |state| {
            assert_eq!(state.memory[0x300..0x305], [0x1, 0x2, 0x3, 0x4, 0x5]);
            assert_eq!(state.index, 0x300);
        },
    );
}

#[test]
fn test_load_registers() {
    do_cycle(
        0xF465,
        |state| {
            state.index = 0x300;
            state.memory[0x300..0x306].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5, 0x6]);
        },
        |state| {
            assert_eq!(state.registers[0x0..0x6], [0x1, 0x2, 0x3, 0x4, 0x5, 0x0]);
            assert_eq!(state.index, 0x305);
        },
    );

    do_cycle_with_config(
        schip(),
        0xF465,
        |state| {
            state.index = 0x300;
            state.memory[0x300..0x305].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5]);
        },
        |state| {
            assert_eq!(state.registers[0x0..0x5], [0x1, 0x2, 0x3, 0x4, 0x5]);
            assert_eq!(state.index, 0x300);
        },
    );
}

#[test]
fn test_bulk_transfer_wraps_index() {
    do_cycle(
        0xF155,
        |state| {
            state.index = 0xFFF;
            state.registers[0] = 0xAA;
            state.registers[1] = 0xBB;
        },
        |state| {
            assert_eq!(state.memory[0xFFF], 0xAA);
            assert_eq!(state.memory[0x000], 0xBB);
            assert_eq!(state.index, 0x001);
        },
    );
}

#[test]
fn test_unsupported_opcode_halts() {
    for opcode in [0x0123u16, 0x5121, 0x800F, 0xE100, 0xF0FF] {
        let mut state = prepare_state_with_single_instruction(Config::default(), opcode);
        let registers = state.registers;

        assert_eq!(
            state.step(),
            Err(MachineError::UnsupportedOpcode {
                opcode,
                address: 0x200
            })
        );
        assert_eq!(state.program_counter, 0x200);
        assert_eq!(state.registers, registers);
    }
}

#[test]
fn test_fetch_wraps_at_end_of_memory() {
    let mut state = Chip8::new();
    state.program_counter = 0xFFF;
    state.memory[0xFFF] = 0x10;
    // second byte is memory[0x000], the first byte of glyph 0
    state.step().unwrap();
    assert_eq!(state.program_counter, 0x0F0);
}

#[test]
fn test_set_memory_byte_through_chip() {
    fn patch<C: Chip>(chip: &mut C, byte: u8, index: C::MemoryAddress) {
        chip.set_memory_byte(byte, index);
    }

    let mut state = prepare_state_with_single_instruction(Config::default(), 0x6100);
    patch(&mut state, 0x99, u12::new(0x201));
    patch(&mut state, 0x42, u12::new(0xFFF));

    assert_eq!(state.memory[0xFFF], 0x42);
    state.step().unwrap();
    assert_eq!(state.registers[1], 0x99);
}
