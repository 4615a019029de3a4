// Included once per flavor by `main.rs`, which defines `flavor`, `Ptr`, and `PtrWeak`.

mod notifier {
    use super::{flavor, Ptr};
    include!("notifier.rs");
}

mod reentrant {
    use super::{flavor, Ptr, PtrWeak};
    include!("reentrant.rs");
}
