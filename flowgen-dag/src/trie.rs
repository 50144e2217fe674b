use flowgen_rule::Field;
use flowgen_types::Key;

/// A binary trie over LPM prefixes. Inserting a prefix materializes both
/// siblings along its path, so the leaves always partition the whole space;
/// they are the finest subdivision induced by the inserted prefixes.
#[derive(Debug)]
pub struct Trie {
    root: Node,
}

#[derive(Debug)]
struct Node {
    prefix: Key,
    len: u8,
    children: [Option<Box<Node>>; 2],
}

impl Node {
    fn new(prefix: Key, len: u8) -> Self {
        Self {
            prefix,
            len,
            children: [None, None],
        }
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            root: Node::new(Key::ZERO, 0),
        }
    }

    pub fn insert(&mut self, field: &Field) {
        let (field_prefix, field_len) = match field {
            Field::Lpm { prefix, len } => (*prefix, *len),
            _ => return,
        };
        let mut node = &mut self.root;
        let mut prefix = Key::ZERO;
        let mut mask = Key::HIGH_BIT;
        for depth in 1..=field_len {
            if node.children[0].is_none() {
                node.children[0] = Some(Box::new(Node::new(prefix, depth)));
            }
            if node.children[1].is_none() {
                node.children[1] = Some(Box::new(Node::new(prefix | mask, depth)));
            }
            let bit = usize::from(!(field_prefix & mask).is_zero());
            if bit == 1 {
                prefix |= mask;
            }
            node = node.children[bit].as_mut().expect("just created");
            mask = mask.shr(1);
        }
    }

    /// Leaf prefixes, 0-child first.
    pub fn leaves(&self) -> Vec<Field> {
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

fn collect(node: &Node, out: &mut Vec<Field>) {
    if node.children[0].is_none() && node.children[1].is_none() {
        out.push(Field::lpm(node.prefix, node.len));
        return;
    }
    for child in node.children.iter().flatten() {
        collect(child, out);
    }
}
