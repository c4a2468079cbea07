mod common;

use common::{running, Unit};
use dryice::hal::Register;
use dryice::NvStore;

#[test]
fn word_round_trips() {
    let (rig, mut unit) = running();

    unit.store_write(&[0xde, 0xad, 0xbe, 0xef]);

    assert_eq!(rig.regs.peek(Register::Dgpr), 0xefbe_adde);

    let mut buf = [0; 4];
    unit.store_read(&mut buf);
    assert_eq!(buf, [0xde, 0xad, 0xbe, 0xef]);
}

#[test]
fn store_access_is_direct() {
    let (rig, mut unit) = running();
    let before = rig.delay.calls();

    unit.store_write(&1u32.to_le_bytes());

    assert_eq!(rig.regs.writes(), [(Register::Dgpr, 1)]);
    assert_eq!(rig.regs.reads_of(Register::Dsr), 0);
    assert_eq!(rig.delay.calls(), before);
}

#[test]
fn partial_words_are_ignored() {
    let (rig, mut unit) = running();
    rig.regs.set(Register::Dgpr, 0x1122_3344);

    unit.store_write(&[1, 2]);
    unit.store_write(&[1, 2, 3, 4, 5]);
    unit.store_write(&[]);

    let mut short = [0xaa; 3];
    unit.store_read(&mut short);

    assert!(rig.regs.writes().is_empty());
    assert_eq!(rig.regs.reads_of(Register::Dgpr), 0);
    assert_eq!(short, [0xaa; 3]);
}

#[test]
fn nvmem_only_serves_offset_zero() {
    let (rig, mut unit) = running();
    assert_eq!(<Unit as NvStore>::SIZE, 4);

    NvStore::write(&mut unit, 4, &[9, 9, 9, 9]).unwrap();
    assert!(rig.regs.writes().is_empty());

    NvStore::write(&mut unit, 0, &[1, 0, 0, 0]).unwrap();
    assert_eq!(rig.regs.peek(Register::Dgpr), 1);

    let mut buf = [0xff; 4];
    NvStore::read(&mut unit, 8, &mut buf).unwrap();
    assert_eq!(buf, [0xff; 4]);

    NvStore::read(&mut unit, 0, &mut buf).unwrap();
    assert_eq!(buf, [1, 0, 0, 0]);
}
