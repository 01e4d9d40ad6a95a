#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::admin::{NewLink, NewSet};
    use crate::error::AppError;
    use crate::models::LinkType;
    use crate::tests::fixtures::{external, setup, upload};
    use crate::types::{LinkDto, NavLink};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn set_named(title: &str, published: NaiveDate) -> NewSet {
        NewSet {
            title: title.to_string(),
            description: format!("{} description", title),
            version: "1.0".to_string(),
            published_date: Some(published),
        }
    }

    fn find<'a>(links: &'a [LinkDto], id: i64) -> &'a LinkDto {
        links.iter().find(|l| l.id == id).unwrap()
    }

    #[tokio::test]
    async fn test_effective_url_follows_link_type() {
        let env = setup().await;
        let ext = env.admin.create_link(external("Docs", "https://example.com/docs")).await.unwrap();
        let up = env.admin.create_link(upload("Manual", "manual.pdf", b"%PDF-1.4")).await.unwrap();

        let links = env.state.catalog.list_links().await.unwrap();
        assert_eq!(find(&links, ext.id).url, "https://example.com/docs");
        assert_eq!(find(&links, ext.id).link_type, LinkType::External);
        assert_eq!(find(&links, up.id).url, "/media/resources/manual.pdf");
        assert_eq!(find(&links, up.id).link_type, LinkType::Upload);
    }

    #[tokio::test]
    async fn test_upload_without_file_falls_back_to_url_column() {
        let env = setup().await;
        let link = env.admin.create_link(external("Legacy", "https://example.com/legacy")).await.unwrap();
        // Flip the type without attaching a file
        sqlx::query("UPDATE resource_links SET link_type = 'UPLOAD' WHERE id = ?1")
            .bind(link.id)
            .execute(&env.state.db)
            .await
            .unwrap();

        let dto = env.state.catalog.get_link(link.id).await.unwrap();
        assert_eq!(dto.link_type, LinkType::Upload);
        assert_eq!(dto.url, "https://example.com/legacy");
        assert_eq!(dto.file_type, None);
    }

    #[tokio::test]
    async fn test_file_type_derivation() {
        let env = setup().await;
        let photo = env.admin.create_link(upload("Photo", "photo.PNG", b"img")).await.unwrap();
        let doc = env.admin.create_link(upload("Doc", "doc.pdf", b"pdf")).await.unwrap();
        let zip = env.admin.create_link(upload("Archive", "archive.zip", b"zip")).await.unwrap();
        let ext = env.admin.create_link(external("Site", "https://example.com/image.png")).await.unwrap();

        let links = env.state.catalog.list_links().await.unwrap();
        assert_eq!(find(&links, photo.id).file_type.as_deref(), Some("image"));
        assert_eq!(find(&links, doc.id).file_type.as_deref(), Some("pdf"));
        assert_eq!(find(&links, zip.id).file_type, None);
        // External links never get a file type, whatever the URL looks like
        assert_eq!(find(&links, ext.id).file_type, None);
    }

    #[tokio::test]
    async fn test_category_and_tags() {
        let env = setup().await;
        let cat = env.admin.create_category("Manuals", "Product manuals").await.unwrap();
        let zeta = env.admin.create_tag("zeta").await.unwrap();
        let alpha = env.admin.create_tag("alpha").await.unwrap();

        let tagged = env
            .admin
            .create_link(NewLink {
                category_id: Some(cat.id),
                tag_ids: vec![zeta.id, alpha.id],
                ..external("Tagged", "https://example.com/t")
            })
            .await
            .unwrap();
        let plain = env.admin.create_link(external("Plain", "https://example.com/p")).await.unwrap();

        let links = env.state.catalog.list_links().await.unwrap();
        let t = find(&links, tagged.id);
        assert_eq!(t.category.as_deref(), Some("Manuals"));
        assert_eq!(t.tags, vec!["alpha".to_string(), "zeta".to_string()]);

        let p = find(&links, plain.id);
        assert_eq!(p.category, None);
        assert!(p.tags.is_empty());

        // Single lookup agrees with the list
        let single = env.state.catalog.get_link(tagged.id).await.unwrap();
        assert_eq!(&single, t);
    }

    #[tokio::test]
    async fn test_deleting_category_keeps_link() {
        let env = setup().await;
        let cat = env.admin.create_category("Temp", "").await.unwrap();
        let link = env
            .admin
            .create_link(NewLink { category_id: Some(cat.id), ..external("L", "https://example.com") })
            .await
            .unwrap();

        env.admin.delete_category(cat.id).await.unwrap();
        let dto = env.state.catalog.get_link(link.id).await.unwrap();
        assert_eq!(dto.category, None);
    }

    #[tokio::test]
    async fn test_links_listed_newest_first() {
        let env = setup().await;
        let a = env.admin.create_link(external("A", "https://example.com/a")).await.unwrap();
        let b = env.admin.create_link(external("B", "https://example.com/b")).await.unwrap();
        let c = env.admin.create_link(external("C", "https://example.com/c")).await.unwrap();

        let ids: Vec<i64> = env.state.catalog.list_links().await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_navigation_within_set() {
        let env = setup().await;
        let set = env.admin.create_set(set_named("Onboarding", date(2024, 3, 1))).await.unwrap();
        let first = env.admin.create_link(external("First", "https://example.com/1")).await.unwrap();
        let second = env.admin.create_link(external("Second", "https://example.com/2")).await.unwrap();
        let third = env.admin.create_link(external("Third", "https://example.com/3")).await.unwrap();
        let loose = env.admin.create_link(external("Loose", "https://example.com/x")).await.unwrap();

        // Inserted out of order on purpose
        env.admin.add_to_set(set.id, third.id, 30).await.unwrap();
        env.admin.add_to_set(set.id, first.id, 10).await.unwrap();
        env.admin.add_to_set(set.id, second.id, 20).await.unwrap();

        let links = env.state.catalog.list_links().await.unwrap();
        let nav = |id: i64, title: &str| Some(NavLink { id, title: title.to_string() });

        let mid = find(&links, second.id);
        assert_eq!(mid.set_id, Some(set.id));
        assert_eq!(mid.set_title.as_deref(), Some("Onboarding"));
        assert_eq!(mid.previous_resource, nav(first.id, "First"));
        assert_eq!(mid.next_resource, nav(third.id, "Third"));

        let head = find(&links, first.id);
        assert_eq!(head.previous_resource, None);
        assert_eq!(head.next_resource, nav(second.id, "Second"));

        let tail = find(&links, third.id);
        assert_eq!(tail.previous_resource, nav(second.id, "Second"));
        assert_eq!(tail.next_resource, None);

        let l = find(&links, loose.id);
        assert_eq!(l.set_id, None);
        assert_eq!(l.set_title, None);
        assert_eq!(l.previous_resource, None);
        assert_eq!(l.next_resource, None);

        // The single-link path computes the same neighbours
        let single = env.state.catalog.get_link(second.id).await.unwrap();
        assert_eq!(single.previous_resource, nav(first.id, "First"));
        assert_eq!(single.next_resource, nav(third.id, "Third"));
    }

    #[tokio::test]
    async fn test_duplicate_orders_navigate_by_strictly_different_order() {
        let env = setup().await;
        let set = env.admin.create_set(set_named("Ties", date(2024, 1, 1))).await.unwrap();
        let a = env.admin.create_link(external("A", "https://example.com/a")).await.unwrap();
        let b = env.admin.create_link(external("B", "https://example.com/b")).await.unwrap();
        let c = env.admin.create_link(external("C", "https://example.com/c")).await.unwrap();
        env.admin.add_to_set(set.id, a.id, 1).await.unwrap();
        env.admin.add_to_set(set.id, b.id, 5).await.unwrap();
        env.admin.add_to_set(set.id, c.id, 5).await.unwrap();

        // Nothing sorts after order 5, and b and c are not each other's neighbours
        let dto = env.state.catalog.get_link(b.id).await.unwrap();
        assert_eq!(dto.previous_resource.map(|n| n.id), Some(a.id));
        assert_eq!(dto.next_resource, None);

        let dto = env.state.catalog.get_link(c.id).await.unwrap();
        assert_eq!(dto.previous_resource.map(|n| n.id), Some(a.id));
        assert_eq!(dto.next_resource, None);

        // Of the two candidates at order 5, the lower link id is next after a
        let links = env.state.catalog.list_links().await.unwrap();
        assert_eq!(find(&links, a.id).next_resource.as_ref().map(|n| n.id), Some(b.id));

        // Listing still shows every member, tied ones by link id
        let detail = env.state.catalog.get_set(set.id).await.unwrap();
        let ids: Vec<i64> = detail.resources.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn test_list_sets_ordering_and_first_resource() {
        let env = setup().await;
        let old = env.admin.create_set(set_named("Old", date(2023, 5, 1))).await.unwrap();
        let new = env.admin.create_set(set_named("New", date(2025, 2, 1))).await.unwrap();
        let mid = env.admin.create_set(set_named("Mid", date(2024, 7, 15))).await.unwrap();

        let x = env.admin.create_link(external("X", "https://example.com/x")).await.unwrap();
        let y = env.admin.create_link(external("Y", "https://example.com/y")).await.unwrap();
        env.admin.add_to_set(new.id, x.id, 7).await.unwrap();
        env.admin.add_to_set(new.id, y.id, 3).await.unwrap();
        env.admin.add_to_set(old.id, x.id, 1).await.unwrap();

        let sets = env.state.catalog.list_sets().await.unwrap();
        let ids: Vec<i64> = sets.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![new.id, mid.id, old.id]);

        assert_eq!(sets[0].first_resource_id, Some(y.id));
        assert_eq!(sets[0].published_date, date(2025, 2, 1));
        assert_eq!(sets[0].version, "1.0");
        assert_eq!(sets[1].first_resource_id, None);
        assert_eq!(sets[2].first_resource_id, Some(x.id));
    }

    #[tokio::test]
    async fn test_set_detail_members_sorted() {
        let env = setup().await;
        let set = env.admin.create_set(set_named("Guide", date(2024, 1, 1))).await.unwrap();
        let mut expected = Vec::new();
        for (title, order) in [("C", 300), ("A", 0), ("B", 42)] {
            let link = env.admin.create_link(external(title, "https://example.com")).await.unwrap();
            env.admin.add_to_set(set.id, link.id, order).await.unwrap();
            expected.push((order, link.id));
        }
        expected.sort();

        let detail = env.state.catalog.get_set(set.id).await.unwrap();
        assert_eq!(detail.title, "Guide");
        let got: Vec<(i64, i64)> = detail.resources.iter().map(|m| (m.order, m.id)).collect();
        assert_eq!(got, expected);
        let titles: Vec<&str> = detail.resources.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let env = setup().await;
        assert!(matches!(env.state.catalog.get_link(999).await, Err(AppError::NotFound(_))));
        assert!(matches!(env.state.catalog.get_set(999).await, Err(AppError::NotFound(_))));
        assert!(env.state.catalog.find_link(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_removed_link_disappears_from_set() {
        let env = setup().await;
        let set = env.admin.create_set(set_named("S", date(2024, 1, 1))).await.unwrap();
        let a = env.admin.create_link(external("A", "https://example.com/a")).await.unwrap();
        let b = env.admin.create_link(external("B", "https://example.com/b")).await.unwrap();
        let c = env.admin.create_link(external("C", "https://example.com/c")).await.unwrap();
        env.admin.add_to_set(set.id, a.id, 1).await.unwrap();
        env.admin.add_to_set(set.id, b.id, 2).await.unwrap();
        env.admin.add_to_set(set.id, c.id, 3).await.unwrap();

        env.admin.delete_link(b.id).await.unwrap();

        let dto = env.state.catalog.get_link(a.id).await.unwrap();
        assert_eq!(dto.next_resource.map(|n| n.id), Some(c.id));
        let detail = env.state.catalog.get_set(set.id).await.unwrap();
        assert_eq!(detail.resources.len(), 2);
    }
}
