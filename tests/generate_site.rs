use std::fs;
use std::path::Path;

use spacetraveling::config::SiteConfig;
use spacetraveling::Blog;

const FIXTURE: &str = r#"{
  "page": 1,
  "results": [
    {
      "id": "YF1",
      "uid": "como-utilizar-hooks",
      "first_publication_date": "2021-03-15T19:25:28+0000",
      "data": {
        "title": "Como utilizar Hooks",
        "subtitle": "Pensando em sincronização em vez de ciclos de vida",
        "author": "Joseph Oliveira",
        "banner": { "url": "https://images.prismic.io/hooks.png", "alt": null },
        "content": [
          {
            "heading": "Proin et varius",
            "body": [
              {
                "type": "paragraph",
                "text": "Nullam dolor sapien, vulputate eu diam at",
                "spans": [{ "start": 0, "end": 6, "type": "strong" }]
              },
              { "type": "list-item", "text": "um", "spans": [] },
              { "type": "list-item", "text": "dois", "spans": [] }
            ]
          }
        ]
      }
    },
    {
      "id": "YF2",
      "uid": "criando-um-app-cra-do-zero",
      "first_publication_date": "2021-03-19T19:25:28+0000",
      "data": {
        "title": "Criando um app CRA do zero",
        "subtitle": "Tudo sobre como criar a sua primeira aplicação",
        "author": "Danilo Vieira",
        "content": []
      }
    },
    {
      "id": "YF3",
      "uid": "mapas-com-react",
      "first_publication_date": "2021-03-25T19:25:28+0000",
      "data": {
        "title": "Mapas com React usando Leaflet",
        "subtitle": "Aprenda a criar mapas com Leaflet",
        "author": ["not", "a", "string"],
        "content": []
      }
    }
  ]
}"#;

fn read(dir: &Path, path: &str) -> String {
    fs::read_to_string(dir.join("public").join(path)).unwrap()
}

fn site(dir: &Path) -> Blog {
    let mut config = SiteConfig::default();
    config.api.page_size = 1;
    config.comments.repo = "owner/blog-comments".to_string();
    fs::write(dir.join("posts.json"), FIXTURE).unwrap();
    fs::create_dir_all(dir.join("static/images")).unwrap();
    fs::write(dir.join("static/images/logo.svg"), "<svg/>").unwrap();
    Blog::with_config(dir, config)
}

#[tokio::test]
async fn generates_accumulated_listing_pages() {
    let dir = tempfile::tempdir().unwrap();
    let blog = site(dir.path());

    let report = blog.generate(Some(Path::new("posts.json"))).await.unwrap();
    assert_eq!(report.listing_pages, 3);
    assert_eq!(report.posts_written, 3);
    assert_eq!(report.posts_skipped, 0);

    let first = read(dir.path(), "index.html");
    assert!(first.contains("Mapas com React usando Leaflet"));
    assert!(!first.contains("Criando um app CRA do zero"));
    assert!(first.contains("Carregar mais posts"));
    assert!(first.contains(r#"href="/page/2/""#));

    let second = read(dir.path(), "page/2/index.html");
    assert!(second.contains("Mapas com React usando Leaflet"));
    assert!(second.contains("Criando um app CRA do zero"));
    assert!(second.contains(r#"href="/page/3/""#));

    let last = read(dir.path(), "page/3/index.html");
    assert!(last.contains("Como utilizar Hooks"));
    assert!(last.contains("19 mar 2021"));
    assert!(!last.contains("Carregar mais posts"));
}

#[tokio::test]
async fn renders_post_pages_with_neighbours_and_comments() {
    let dir = tempfile::tempdir().unwrap();
    let blog = site(dir.path());
    blog.generate(Some(Path::new("posts.json"))).await.unwrap();

    // Newest first: mapas, criando, como-utilizar
    let middle = read(dir.path(), "post/criando-um-app-cra-do-zero/index.html");
    assert!(middle.contains(r#"<a href="/post/mapas-com-react/">Post anterior</a>"#));
    assert!(middle.contains(r#"<a href="/post/como-utilizar-hooks/">Próximo post</a>"#));
    assert!(middle.contains("0 min"));

    let oldest = read(dir.path(), "post/como-utilizar-hooks/index.html");
    assert!(oldest.contains(r#"<img src="https://images.prismic.io/hooks.png" alt="Banner">"#));
    assert!(oldest.contains("<strong>Nullam</strong> dolor"));
    assert!(oldest.contains("<ul><li>um</li><li>dois</li></ul>"));
    assert!(oldest.contains("1 min"));
    assert!(oldest.contains("15 mar 2021"));
    assert!(oldest.contains(r#"repo="owner/blog-comments""#));
    assert!(!oldest.contains("Próximo post"));

    // A non-string author is treated as empty text
    let newest = read(dir.path(), "post/mapas-com-react/index.html");
    assert!(!newest.contains("icon-user"));

    assert!(dir.path().join("public/css/style.css").exists());
    assert_eq!(read(dir.path(), "images/logo.svg"), "<svg/>");
}

#[tokio::test]
async fn comments_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut blog = site(dir.path());
    blog.config.comments.enable = false;
    blog.generate(Some(Path::new("posts.json"))).await.unwrap();

    let post = read(dir.path(), "post/como-utilizar-hooks/index.html");
    assert!(!post.contains("utteranc.es"));
    assert!(!post.contains(r#"id="comments""#));
}

#[tokio::test]
async fn missing_fixture_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blog = Blog::with_config(dir.path(), SiteConfig::default());
    assert!(blog.generate(Some(Path::new("nope.json"))).await.is_err());
}

#[tokio::test]
async fn clean_removes_generated_site() {
    let dir = tempfile::tempdir().unwrap();
    let blog = site(dir.path());
    blog.generate(Some(Path::new("posts.json"))).await.unwrap();
    assert!(blog.public_dir.join("index.html").exists());

    blog.clean().unwrap();
    assert!(!blog.public_dir.exists());
}
