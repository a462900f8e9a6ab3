//! HTML element catalog
//!
//! Read-only table classifying element names for the balancing automaton:
//! void elements, raw-text elements and elements that implicitly close an
//! open sibling. Lookup is ASCII case-insensitive.
//!
//! The table is sorted by name and segmented by first letter at compile
//! time, so a lookup scans only the handful of entries sharing the name's
//! first letter.

/// Implied close rule: opening this element closes an open `closes`
/// element, unless one of `limits` is open above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingRule {
    pub closes: &'static [&'static str],
    pub limits: &'static [&'static str],
}

/// Behavior of one element name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpec {
    pub name: &'static str,
    /// Never has content; emitted as a standalone element
    pub void: bool,
    /// Content is literal text up to the matching close tag
    pub raw_text: bool,
    pub sibling: Option<&'static SiblingRule>,
}

const LI: SiblingRule = SiblingRule {
    closes: &["li"],
    limits: &["ul", "ol"],
};
const DT_DD: SiblingRule = SiblingRule {
    closes: &["dt", "dd"],
    limits: &["dl"],
};
const TR: SiblingRule = SiblingRule {
    closes: &["tr"],
    limits: &["table", "thead", "tbody", "tfoot"],
};
const CELL: SiblingRule = SiblingRule {
    closes: &["td", "th"],
    limits: &["tr", "table", "thead", "tbody", "tfoot"],
};
const SECTION: SiblingRule = SiblingRule {
    closes: &["thead", "tbody", "tfoot", "tr", "td", "th"],
    limits: &["table"],
};
const OPTION: SiblingRule = SiblingRule {
    closes: &["option"],
    limits: &["select", "optgroup", "datalist"],
};
const OPTGROUP: SiblingRule = SiblingRule {
    closes: &["optgroup", "option"],
    limits: &["select"],
};
const RUBY: SiblingRule = SiblingRule {
    closes: &["rt", "rp"],
    limits: &["ruby"],
};
const BLOCK: SiblingRule = SiblingRule {
    closes: &["p"],
    limits: &["button", "caption", "object", "table", "td", "th", "template"],
};

const fn plain(name: &'static str) -> ElementSpec {
    ElementSpec {
        name,
        void: false,
        raw_text: false,
        sibling: None,
    }
}

const fn void(name: &'static str) -> ElementSpec {
    ElementSpec {
        void: true,
        ..plain(name)
    }
}

const fn raw(name: &'static str) -> ElementSpec {
    ElementSpec {
        raw_text: true,
        ..plain(name)
    }
}

const fn closing(name: &'static str, rule: &'static SiblingRule) -> ElementSpec {
    ElementSpec {
        sibling: Some(rule),
        ..plain(name)
    }
}

/// Sorted by name; checked by `test_table_sorted`
static ELEMENTS: &[ElementSpec] = &[
    closing("address", &BLOCK),
    void("area"),
    closing("article", &BLOCK),
    closing("aside", &BLOCK),
    void("base"),
    closing("blockquote", &BLOCK),
    void("br"),
    void("col"),
    void("command"),
    closing("dd", &DT_DD),
    closing("details", &BLOCK),
    closing("dialog", &BLOCK),
    closing("div", &BLOCK),
    closing("dl", &BLOCK),
    closing("dt", &DT_DD),
    void("embed"),
    closing("fieldset", &BLOCK),
    closing("figcaption", &BLOCK),
    closing("figure", &BLOCK),
    closing("footer", &BLOCK),
    closing("form", &BLOCK),
    closing("h1", &BLOCK),
    closing("h2", &BLOCK),
    closing("h3", &BLOCK),
    closing("h4", &BLOCK),
    closing("h5", &BLOCK),
    closing("h6", &BLOCK),
    closing("header", &BLOCK),
    closing("hgroup", &BLOCK),
    ElementSpec {
        void: true,
        ..closing("hr", &BLOCK)
    },
    raw("iframe"),
    void("img"),
    void("input"),
    void("keygen"),
    closing("li", &LI),
    void("link"),
    closing("main", &BLOCK),
    closing("menu", &BLOCK),
    void("meta"),
    closing("nav", &BLOCK),
    raw("noembed"),
    raw("noframes"),
    closing("ol", &BLOCK),
    closing("optgroup", &OPTGROUP),
    closing("option", &OPTION),
    closing("p", &BLOCK),
    void("param"),
    closing("pre", &BLOCK),
    closing("rp", &RUBY),
    closing("rt", &RUBY),
    raw("script"),
    closing("section", &BLOCK),
    void("source"),
    raw("style"),
    closing("table", &BLOCK),
    closing("tbody", &SECTION),
    closing("td", &CELL),
    raw("textarea"),
    closing("tfoot", &SECTION),
    closing("th", &CELL),
    closing("thead", &SECTION),
    raw("title"),
    closing("tr", &TR),
    void("track"),
    closing("ul", &BLOCK),
    void("wbr"),
    raw("xmp"),
];

/// Element catalog with per-letter segments over a sorted table
#[derive(Debug)]
pub struct ElementCatalog {
    table: &'static [ElementSpec],
    /// `[start, end)` into `table` for each letter a..z
    segments: [(u16, u16); 26],
}

static HTML: ElementCatalog = ElementCatalog {
    table: ELEMENTS,
    segments: segments(ELEMENTS),
};

const fn segments(table: &[ElementSpec]) -> [(u16, u16); 26] {
    let mut out = [(0u16, 0u16); 26];
    let mut i = 0;
    while i < table.len() {
        let letter = (table[i].name.as_bytes()[0] - b'a') as usize;
        if out[letter].1 == 0 {
            out[letter].0 = i as u16;
        }
        out[letter].1 = (i + 1) as u16;
        i += 1;
    }
    out
}

impl ElementCatalog {
    /// The HTML element catalog
    pub fn html() -> &'static ElementCatalog {
        &HTML
    }

    /// Look up an element name, ASCII case-insensitively
    pub fn lookup(&self, name: &[u8]) -> Option<&'static ElementSpec> {
        let first = name.first()?.to_ascii_lowercase();
        if !first.is_ascii_lowercase() {
            return None;
        }
        let (start, end) = self.segments[(first - b'a') as usize];
        self.table[start as usize..end as usize]
            .iter()
            .find(|spec| spec.name.as_bytes().eq_ignore_ascii_case(name))
    }

    pub fn is_void(&self, name: &[u8]) -> bool {
        self.lookup(name).is_some_and(|spec| spec.void)
    }

    pub fn is_raw_text(&self, name: &[u8]) -> bool {
        self.lookup(name).is_some_and(|spec| spec.raw_text)
    }

    pub fn sibling_rule(&self, name: &[u8]) -> Option<&'static SiblingRule> {
        self.lookup(name).and_then(|spec| spec.sibling)
    }
}

impl SiblingRule {
    pub fn closes_name(&self, name: &[u8]) -> bool {
        self.closes.iter().any(|c| c.as_bytes().eq_ignore_ascii_case(name))
    }

    pub fn is_limit(&self, name: &[u8]) -> bool {
        self.limits.iter().any(|l| l.as_bytes().eq_ignore_ascii_case(name))
    }
}
