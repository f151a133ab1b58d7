use super::*;

struct Family {
    table: ClassTable,
    base: ClassId,
    public_child: ClassId,
    private_child: ClassId,
    grandchild: ClassId,
    stranger: ClassId,
}

fn family() -> Family {
    let table = ClassTable::new();
    let base = table.declare("Base", &[]).unwrap();
    let public_child = table.declare("Public", &[(base, false)]).unwrap();
    let private_child = table.declare("Private", &[(base, true)]).unwrap();
    let grandchild = table.declare("Grand", &[(public_child, false)]).unwrap();
    let stranger = table.declare("Stranger", &[]).unwrap();
    Family {
        table,
        base,
        public_child,
        private_child,
        grandchild,
        stranger,
    }
}

#[test]
fn self_relation() {
    let f = family();
    assert_eq!(
        f.table.relation(f.base, f.base),
        Some(Inheritance {
            distance: 0,
            private: false
        })
    );
}

#[test]
fn public_and_private_paths() {
    let f = family();
    assert_eq!(
        f.table.relation(f.base, f.grandchild),
        Some(Inheritance {
            distance: 2,
            private: false
        })
    );
    assert_eq!(
        f.table.relation(f.base, f.private_child),
        Some(Inheritance {
            distance: 1,
            private: true
        })
    );
    assert_eq!(f.table.relation(f.public_child, f.base), None);
    assert_eq!(f.table.relation(f.base, f.stranger), None);
}

#[test]
fn public_path_preferred_over_private() {
    let table = ClassTable::new();
    let base = table.declare("Base", &[]).unwrap();
    let mid = table.declare("Mid", &[(base, false)]).unwrap();
    let both = table.declare("Both", &[(base, true), (mid, false)]).unwrap();
    assert_eq!(
        table.relation(base, both),
        Some(Inheritance {
            distance: 2,
            private: false
        })
    );
}

#[test]
fn private_access_from_inside() {
    let f = family();
    assert!(f.table.can_access_private(f.base, Some(f.private_child)));
    assert!(f.table.can_access_private(f.base, Some(f.base)));
    assert!(!f.table.can_access_private(f.base, Some(f.stranger)));
    assert!(!f.table.can_access_private(f.base, None));
}

#[test]
fn names_and_lookup() {
    let f = family();
    assert_eq!(f.table.class_name(f.grandchild).as_deref(), Some("Grand"));
    assert_eq!(f.table.class_name(ClassId::from_raw(77)), None);
    assert_eq!(f.table.lookup("Stranger"), Some(f.stranger));
    assert_eq!(f.table.len(), 5);
    assert!(!f.table.is_empty());
}

#[test]
fn declaration_errors() {
    let f = family();
    assert_eq!(
        f.table.declare("Base", &[]),
        Err(RegistryError::DuplicateName("Base".to_owned()))
    );
    assert_eq!(
        f.table.declare("Orphan", &[(ClassId::from_raw(40), false)]),
        Err(RegistryError::UnknownClass(ClassId::from_raw(40)))
    );
}
