use super::super::error::Error;
use super::super::step::Step;

#[test]
fn round_trips_through_id() {
    for id in 0u8..=7 {
        let step = Step::try_from(id).unwrap();
        assert_eq!(step.id(), id);
    }
}

#[test]
fn rejects_unknown_id() {
    assert!(matches!(Step::try_from(8), Err(Error::UnknownStep(8))));
}
