//! User rewrite rules

use odtmark_ast::{Payload, Tag, TagTree};

use super::PassContext;

/// Replace links and images matched by a rewrite rule with raw output
///
/// Rules are tried in configuration order; the first one producing a
/// replacement wins.
pub(super) fn apply_rules(tree: &mut TagTree, ctx: &mut PassContext<'_>) {
    if ctx.rules.is_empty() {
        return;
    }
    for node in tree.descendants(tree.root()) {
        let Some(tag @ (Tag::A | Tag::Img)) = tree.tag(node) else {
            continue;
        };
        if !tree.is_attached(node) {
            continue;
        }
        let payload = tree.payload(node).cloned().unwrap_or_default();
        let Some(href) = payload.href.as_deref() else {
            continue;
        };
        let label = match tag {
            Tag::Img => payload.alt.clone().unwrap_or_default(),
            _ => tree.text_content(node),
        };

        let Some(replacement) = ctx.rules.iter().find_map(|rule| rule.apply(tag, href, &label))
        else {
            continue;
        };
        log::debug!("rewrite rule matched {href}");
        let raw = tree.create_tag(Tag::Raw, Payload::text(replacement));
        tree.insert_before(node, raw);
        tree.detach(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConvertOptions, RewriteRule};
    use crate::rewrite::CompiledRule;

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = [
            RewriteRule {
                tag: Some("img".into()),
                pattern: r"\.png$".into(),
                capture: None,
                replace: "{{< figure src=\"$basename\" alt=\"$label\" >}}".into(),
            },
            RewriteRule {
                tag: None,
                pattern: "png".into(),
                capture: None,
                replace: "unused".into(),
            },
            RewriteRule {
                tag: Some("a".into()),
                pattern: r"^gdoc:(\w+)$".into(),
                capture: None,
                replace: "{{< ref \"$value\" >}}".into(),
            },
        ];
        let compiled: Vec<_> = rules
            .iter()
            .map(|r| CompiledRule::new(r).unwrap())
            .collect();

        let mut tree = TagTree::new();
        let root = tree.root();
        let p = tree.append_tag(root, Tag::P, Payload::default());
        tree.append_tag(
            p,
            Tag::Img,
            Payload {
                href: Some("assets/chart.png".into()),
                alt: Some("Chart".into()),
                ..Default::default()
            },
        );
        let link = tree.append_tag(p, Tag::A, Payload::href("gdoc:abc123"));
        tree.append_text(link, "other doc");
        let plain = tree.append_tag(p, Tag::A, Payload::href("https://x.test"));
        tree.append_text(plain, "x");

        let options = ConvertOptions::default();
        let mut ctx = PassContext::new(&options, &compiled);
        apply_rules(&mut tree, &mut ctx);

        let raws: Vec<_> = tree
            .find_all(root, Tag::Raw)
            .into_iter()
            .filter_map(|n| tree.payload(n).and_then(|p| p.text.clone()))
            .collect();
        assert_eq!(
            raws,
            vec![
                "{{< figure src=\"chart.png\" alt=\"Chart\" >}}".to_string(),
                "{{< ref \"abc123\" >}}".to_string(),
            ]
        );
        assert!(tree.is_attached(plain));
    }
}
