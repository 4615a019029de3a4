use pretty_assertions::assert_eq;
use subpool::{BoxError, Recorder, Subscriber, SubscriberId};

use flavor::Notifier;

#[derive(Debug)]
struct Failing;

impl<M> Subscriber<M> for Failing {
    fn update(&self, _: &M) -> Result<(), BoxError> {
        Err("refused".into())
    }
}

#[test]
fn basics_and_debug() {
    let cn: Notifier<u8> = Notifier::new();
    assert_eq!(format!("{cn:?}"), "Notifier(0)");
    cn.notify().unwrap();
    assert_eq!(format!("{cn:?}"), "Notifier(0)");
    let recorder = Ptr::new(Recorder::new());
    cn.attach(&recorder);
    assert_eq!(format!("{cn:?}"), "Notifier(1)");
    // type annotation to prevent spurious inference failures in the presence
    // of other compiler errors
    assert_eq!(recorder.drain(), Vec::<u8>::new());
    cn.set_state(1).unwrap();
    cn.set_state(2).unwrap();
    assert_eq!(recorder.drain(), vec![1, 2]);
    assert_eq!(format!("{cn:?}"), "Notifier(1)");
}

#[test]
fn notify_with_no_subscribers() {
    let notifier: Notifier<String> = Notifier::new();
    notifier.notify().unwrap();
    notifier.set_state("unheard".into()).unwrap();
    assert_eq!(notifier.state(), "unheard");
}

#[test]
fn notify_delivers_initial_state() {
    let notifier = Notifier::with_state("initial".to_string());
    let recorder = Ptr::new(Recorder::new());
    notifier.attach(&recorder);
    notifier.notify().unwrap();
    assert_eq!(recorder.drain(), vec!["initial".to_string()]);
}

#[test]
fn set_state_delivers_once_to_each() {
    let notifier: Notifier<String> = Notifier::new();
    let s1 = Ptr::new(Recorder::new());
    let s2 = Ptr::new(Recorder::new());
    notifier.attach(&s1);
    notifier.attach(&s2);

    notifier.set_state("hello".into()).unwrap();

    assert_eq!(s1.drain(), vec!["hello".to_string()]);
    assert_eq!(s2.drain(), vec!["hello".to_string()]);
}

#[test]
fn duplicate_attach_is_ignored() {
    let notifier: Notifier<u8> = Notifier::new();
    let recorder = Ptr::new(Recorder::new());
    let first = notifier.attach(&recorder);
    let second = notifier.attach(&recorder);
    assert_eq!(first, second);
    assert_eq!(notifier.count(), 1);

    notifier.set_state(5).unwrap();
    assert_eq!(recorder.drain(), vec![5]);
}

#[test]
fn registry_tracks_attach_and_detach() {
    let notifier: Notifier<u8> = Notifier::new();
    let a = Ptr::new(Recorder::new());
    let b = Ptr::new(Recorder::new());
    let c = Ptr::new(Recorder::new());

    notifier.attach(&a);
    notifier.attach(&b);
    assert_eq!(notifier.count(), 2);
    assert!(notifier.detach(&a));
    assert_eq!(notifier.count(), 1);
    // not attached: no-op
    assert!(!notifier.detach(&a));
    assert!(!notifier.detach(&c));
    assert_eq!(notifier.count(), 1);
    notifier.attach(&c);
    notifier.attach(&a);
    assert_eq!(notifier.count(), 3);

    notifier.set_state(9).unwrap();
    assert_eq!(
        [a.drain(), b.drain(), c.drain()],
        [vec![9], vec![9], vec![9]]
    );
}

#[test]
fn detach_by_id() {
    let notifier: Notifier<u8> = Notifier::new();
    let a = Ptr::new(Recorder::new());
    let id = notifier.attach(&a);
    assert!(notifier.detach_id(id));
    assert!(!notifier.detach_id(id));
    notifier.set_state(1).unwrap();
    assert_eq!(a.drain(), Vec::<u8>::new());
}

#[test]
fn dropped_subscriber_is_forgotten() {
    let notifier: Notifier<u8> = Notifier::new();
    let kept = Ptr::new(Recorder::new());
    let dropped = Ptr::new(Recorder::new());
    notifier.attach(&kept);
    notifier.attach(&dropped);
    drop(dropped);

    assert_eq!(notifier.count(), 1);
    notifier.set_state(3).unwrap();
    assert_eq!(kept.drain(), vec![3]);
}

#[test]
fn failing_subscriber_stops_delivery() {
    let notifier: Notifier<u8> = Notifier::new();
    let before = Ptr::new(Recorder::new());
    let failing = Ptr::new(Failing);
    let after = Ptr::new(Recorder::new());
    notifier.attach(&before);
    let failing_id = notifier.attach(&failing);
    notifier.attach(&after);

    let error = notifier.set_state(7).unwrap_err();
    assert_eq!(error.subscriber(), failing_id);
    assert_eq!(error.into_source().to_string(), "refused");
    assert_eq!(before.drain(), vec![7]);
    assert_eq!(after.drain(), Vec::<u8>::new());
    // the state change itself is kept
    assert_eq!(notifier.state(), 7);

    notifier.detach(&failing);
    notifier.notify().unwrap();
    assert_eq!(before.drain(), vec![7]);
    assert_eq!(after.drain(), vec![7]);
}

#[test]
fn notify_except_skips_modifier() {
    let notifier: Notifier<u8> = Notifier::new();
    let modifier = Ptr::new(Recorder::new());
    let other = Ptr::new(Recorder::new());
    let modifier_id: SubscriberId = notifier.attach(&modifier);
    notifier.attach(&other);

    notifier.notify_except(modifier_id).unwrap();
    assert_eq!(modifier.drain(), Vec::<u8>::new());
    assert_eq!(other.drain(), vec![0]);
}

#[test]
fn notify_except_reports_failure() {
    let notifier: Notifier<u8> = Notifier::new();
    let modifier = Ptr::new(Recorder::new());
    let failing = Ptr::new(Failing);
    let after = Ptr::new(Recorder::new());
    let modifier_id = notifier.attach(&modifier);
    let failing_id = notifier.attach(&failing);
    notifier.attach(&after);

    let error = notifier.notify_except(modifier_id).unwrap_err();
    assert_eq!(error.subscriber(), failing_id);
    assert_eq!(after.drain(), Vec::<u8>::new());
    assert_eq!(modifier.drain(), Vec::<u8>::new());
}

#[test]
fn dropped_subscriber_is_pruned_by_delivery() {
    let notifier: Notifier<u8> = Notifier::new();
    let kept = Ptr::new(Recorder::new());
    let dropped = Ptr::new(Recorder::new());
    notifier.attach(&kept);
    notifier.attach(&dropped);
    drop(dropped);

    notifier.set_state(1).unwrap();
    assert_eq!(format!("{notifier:?}"), "Notifier(1)");
}
