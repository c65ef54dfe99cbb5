use super::*;
use pretty_assertions::assert_eq;

struct Node {
    name: String,
    args: Vec<u32>,
    attrs: BTreeMap<String, String>,
}

fn node() -> Node {
    let mut attrs = BTreeMap::new();
    attrs.insert("k1".to_string(), "foo".to_string());
    attrs.insert("k2".to_string(), "bar".to_string());
    Node {
        name: "conv".to_string(),
        args: vec![10, 20],
        attrs,
    }
}

#[test]
fn root_value_is_at_root() {
    let n = node();
    let traced = Traced::root(&n);
    assert_eq!(traced.path(), &Path::root());
    assert!(std::ptr::eq(*traced.get(), &n));
}

#[test]
fn attr_extends_path() {
    let n = node();
    let traced = Traced::root(&n);
    let name = traced.attr("name", |n| n.name.as_str());
    assert_eq!(*name.get(), "conv");
    assert_eq!(name.path(), &Path::root().attr("name"));
}

#[test]
fn slice_index_and_iter() {
    let n = node();
    let args = Traced::root(&n).attr("args", |n| n.args.as_slice());
    assert_eq!(args.len(), 2);
    assert!(!args.is_empty());

    let second = args.index(1).map(|t| (**t.get(), t.path().clone()));
    assert_eq!(
        second,
        Some((20, Path::root().attr("args").array_index(1)))
    );
    assert!(args.index(2).is_none());

    let collected: Vec<(u32, String)> = args
        .iter()
        .map(|t| (**t.get(), t.path().to_string()))
        .collect();
    assert_eq!(
        collected,
        vec![(10, "<root>.args[0]".to_string()), (20, "<root>.args[1]".to_string())]
    );
}

#[test]
fn map_get_and_iter() {
    let n = node();
    let attrs = Traced::root(&n).attr("attrs", |n| &n.attrs);
    assert_eq!(attrs.len(), 2);

    let value = attrs.lookup("k1").map(|t| (t.get().as_str(), t.path().clone()));
    assert_eq!(
        value,
        Some(("foo", Path::root().attr("attrs").map_value("k1")))
    );
    assert!(attrs.lookup("missing").is_none());

    let mut seen = Vec::new();
    for (key, traced) in attrs.iter() {
        assert_eq!(traced.path(), &Path::root().attr("attrs").map_value(key.clone()));
        seen.push(key.as_str());
    }
    assert_eq!(seen, vec!["k1", "k2"]);
}

#[test]
fn map_keeps_path() {
    let traced = Traced::new(3_u32, Path::root().attr("x"));
    let doubled = traced.map(|v| v * 2);
    assert_eq!(doubled.get(), &6);
    assert_eq!(doubled.path().to_string(), "<root>.x");
    let (value, path) = doubled.into_parts();
    assert_eq!(value, 6);
    assert_eq!(path.len(), 1);
}
