use std::time::Duration;

use nibble8_core::{Config, Instruction, Machine, MachineError, Result, Scheduler, Step};

fn assemble(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|word| word.to_be_bytes()).collect()
}

fn machine(program: &[u16]) -> Result<Machine> {
    Machine::with_program(&assemble(program), Config::default().with_seed(7))
}

#[test]
fn one_simulated_second_at_500_hz() -> Result<()> {
    let mut machine = machine(&[0x1200])?;
    machine.state_mut().delay_timer = 200;
    machine.state_mut().sound_timer = 200;

    let mut scheduler = Scheduler::new(500);
    for _ in 0..250 {
        let due = scheduler.advance(Duration::from_millis(4));
        machine.run_due(due)?;
    }

    assert_eq!(machine.cycles(), 500);
    assert_eq!(machine.state().delay_timer, 140);
    assert_eq!(machine.state().sound_timer, 140);
    Ok(())
}

#[test]
fn timer_rate_does_not_follow_clock_rate() -> Result<()> {
    for clock_hz in [60, 500, 1000, 1234] {
        let mut machine = machine(&[0x1200])?;
        machine.state_mut().delay_timer = 255;

        let mut scheduler = Scheduler::new(clock_hz);
        let due = scheduler.advance(Duration::from_secs(1));
        machine.run_due(due)?;

        assert_eq!(machine.cycles(), clock_hz as u64);
        assert_eq!(machine.state().delay_timer, 255 - 60, "at {clock_hz} Hz");
    }
    Ok(())
}

#[test]
fn delay_loop_counts_down_to_zero() -> Result<()> {
    // DT = 3, poll DT into V1 until it reads zero, then V2 = 1 and spin
    let mut machine = machine(&[0x6003, 0xF015, 0xF107, 0x3100, 0x1204, 0x6201, 0x120C])?;
    let mut scheduler = Scheduler::new(500);
    for _ in 0..100 {
        machine.run_due(scheduler.advance(Duration::from_millis(2)))?;
    }
    assert_eq!(machine.state().delay_timer, 0);
    assert_eq!(machine.state().register(2), 1);
    Ok(())
}

#[test]
fn sixteen_nested_calls_then_overflow() -> Result<()> {
    // each subroutine calls the next one two bytes further on
    let program: Vec<u16> = (0..17).map(|depth| 0x2202 + depth * 2).collect();
    let mut machine = machine(&program)?;
    for _ in 0..16 {
        machine.step()?;
    }
    assert_eq!(machine.state().stack_pointer, 16);
    assert!(matches!(
        machine.step(),
        Err(MachineError::StackOverflow { pc: 0x220 })
    ));
    Ok(())
}

#[test]
fn balanced_calls_unwind() -> Result<()> {
    // 0x200: CALL 0x206; 0x202: CALL 0x206; 0x204: JP 0x204
    // 0x206: ADD V0, 5; RET
    let mut machine = machine(&[0x2206, 0x2206, 0x1204, 0x7005, 0x00EE])?;
    for _ in 0..7 {
        machine.step()?;
    }
    assert_eq!(machine.state().register(0), 10);
    assert_eq!(machine.state().stack_pointer, 0);
    assert_eq!(machine.state().program_counter, 0x204);
    Ok(())
}

#[test]
fn draws_a_digit_from_the_font() -> Result<()> {
    // V0 = 7, I = glyph(V0), V1 = V2 = 10, DRW V1, V2, 5
    let mut machine = machine(&[0x6007, 0xF029, 0x610A, 0x620A, 0xD125])?;
    for _ in 0..5 {
        machine.step()?;
    }
    let display = machine.display();
    // glyph 7: F0 10 20 40 40
    assert!((10..14).all(|x| display.pixel(x, 10)));
    assert!(display.pixel(13, 11));
    assert!(display.pixel(12, 12));
    assert!(display.pixel(11, 13));
    assert!(display.pixel(11, 14));
    assert!(!display.pixel(10, 14));
    assert_eq!(machine.state().register(0xF), 0);
    Ok(())
}

#[test]
fn sprite_at_column_60_wraps_to_column_0() -> Result<()> {
    // store a full row at 0x300, then draw it at (60, 0)
    let mut machine = machine(&[0x60FF, 0xA300, 0xF055, 0x613C, 0x6200, 0xD121])?;
    for _ in 0..6 {
        machine.step()?;
    }
    let display = machine.display();
    for x in [60, 61, 62, 63, 0, 1, 2, 3] {
        assert!(display.pixel(x, 0), "column {x}");
    }
    assert!(!display.pixel(4, 0));
    assert!(!display.pixel(59, 0));
    Ok(())
}

#[test]
fn wait_key_resumes_with_the_pressed_key() -> Result<()> {
    let mut machine = machine(&[0xF50A, 0x6001])?;
    for _ in 0..3 {
        assert_eq!(machine.step()?, Step::WaitingForKey);
    }
    assert_eq!(machine.state().program_counter, 0x200);

    machine.keypad_mut().set(0xE, true);
    assert_eq!(machine.step()?, Step::Executed(Instruction::WaitKey { x: 5 }));
    assert_eq!(machine.state().register(5), 0xE);

    machine.step()?;
    assert_eq!(machine.state().program_counter, 0x204);
    Ok(())
}

#[test]
fn rom_too_large_is_rejected() {
    let rom = vec![0u8; 4096 - 0x200 + 1];
    assert!(matches!(
        Machine::with_program(&rom, Config::default()),
        Err(MachineError::RomTooLarge { .. })
    ));
}

#[test]
fn trace_disassembly_matches_program() {
    let listing: Vec<String> = [0x00E0, 0xA22A, 0x600C, 0xD01F, 0x7009, 0x1208]
        .into_iter()
        .map(|word| Instruction::from(word).to_string())
        .collect();
    assert_eq!(
        listing,
        ["CLS", "LD I, 0x22A", "LD V0, 0x0C", "DRW V0, V1, 15", "ADD V0, 0x09", "JP 0x208"]
    );
}
