use std::collections::BTreeMap;

use crate::cli::context::Context;
use crate::core::errors::Result;

/// Execute `tresor tree`: live objects grouped by `/`-separated path segments.
pub fn execute(ctx: &Context, prefix: Option<&str>) -> Result<()> {
    let listing = ctx
        .objects()
        .list_objects(ctx.bucket(), prefix, false)?;

    println!("{}", ctx.bucket());
    print!("{}", render(listing.iter().map(|attrs| attrs.name.as_str())));
    Ok(())
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

impl Node {
    fn insert(&mut self, name: &str) {
        let mut node = self;
        for segment in name.split('/').filter(|s| !s.is_empty()) {
            node = node.children.entry(segment.to_string()).or_default();
        }
    }

    fn render_into(&self, indent: &str, out: &mut String) {
        let count = self.children.len();
        for (i, (segment, child)) in self.children.iter().enumerate() {
            let last = i + 1 == count;
            let (branch, next) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
            out.push_str(&format!("{indent}{branch}{segment}\n"));
            child.render_into(&format!("{indent}{next}"), out);
        }
    }
}

fn render<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut root = Node::default();
    for name in names {
        root.insert(name);
    }
    let mut out = String::new();
    root.render_into("", &mut out);
    out
}
