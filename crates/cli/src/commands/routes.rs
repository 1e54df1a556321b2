use campusgate_router::{RouteKind, RouteTable};

pub fn run(json: bool) -> anyhow::Result<()> {
    let table = RouteTable::standard()?;

    if json {
        let routes: Vec<_> = table.iter().map(|route| route.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    for route in table.iter() {
        let realm = route
            .flags
            .required_realms()
            .next()
            .map(|realm| realm.as_str())
            .unwrap_or("-");
        let kind = match route.kind {
            RouteKind::Page => "page".to_string(),
            RouteKind::Login(realm) => format!("login:{realm}"),
            RouteKind::Home(realm) => format!("home:{realm}"),
            RouteKind::ForcedAction => "forced-action".to_string(),
        };
        let target = match (&route.redirect, &route.title) {
            (Some(redirect), _) => format!("-> {redirect}"),
            (None, Some(title)) => title.clone(),
            (None, None) => String::new(),
        };
        println!(
            "{:<48} {:<26} {:<18} {:<16} {}",
            route.pattern.as_str(),
            route.name,
            kind,
            realm,
            target
        );
    }
    println!("unmatched paths -> {}", table.fallback());
    Ok(())
}
