use instrument_harvest::browser::connect_to_browser_and_page;
use instrument_harvest::config::Config;
use instrument_harvest::logger;
use instrument_harvest::models::load_locator_table;
use instrument_harvest::services::Navigator;
use instrument_harvest::{App, CdpSession, Session};

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 测试浏览器连接
    let result = connect_to_browser_and_page(
        config.browser_debug_port,
        config.landing_url.as_deref(),
        config.target_title.as_deref(),
    )
    .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_open_single_instrument() {
    logger::init();

    let config = Config::from_env();
    let table = load_locator_table(&config.layout_path)
        .await
        .expect("加载布局文件失败");

    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        config.landing_url.as_deref(),
        config.target_title.as_deref(),
    )
    .await
    .expect("连接浏览器失败");

    let session = CdpSession::new(page, config.poll_interval);
    let landing = match &config.landing_url {
        Some(url) => url.clone(),
        None => session
            .current_url()
            .await
            .expect("读取当前页面失败")
            .expect("页面没有 URL"),
    };

    // 注意：请把 TEST_INSTRUMENT 设置为门户中真实存在的编号
    let identifier = std::env::var("TEST_INSTRUMENT").expect("需要设置 TEST_INSTRUMENT");

    let navigator = Navigator::new(table.navigation.clone(), landing, &config);
    navigator
        .reset_to_landing(&session)
        .await
        .expect("无法返回首页");
    assert!(
        navigator.open_instrument(&session, &identifier).await,
        "应该能够打开编号详情"
    );

    let section = &table.sections[0];
    session
        .wait_for(&section.menu, config.element_wait)
        .await
        .expect("编号详情中应该有分区菜单");
}

#[tokio::test]
#[ignore]
async fn test_full_run() {
    logger::init();

    let config = Config::from_env();
    let app = App::initialize(config).await.expect("初始化失败");
    let summary = app.run().await.expect("批处理失败");

    println!("完成 {} 个，跳过 {} 个", summary.completed, summary.skipped);
    if let Some(report) = summary.validation {
        assert!(report.unexpected_in_output.is_empty());
    }
}
