// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

fn date_range(cmd: Command) -> Command {
    cmd.arg(opt("from").help("Start date YYYY-MM-DD"))
        .arg(opt("to").help("End date YYYY-MM-DD"))
}

fn out_arg() -> Arg {
    Arg::new("out")
        .long("out")
        .help("Output path (default <resource>_<date>.csv)")
}

/// Purchase fields. `add` requires the core ones and fills defaults;
/// `update` takes each as optional.
fn purchase_args(cmd: Command, adding: bool) -> Command {
    let defaulted = |a: Arg, v: &'static str| if adding { a.default_value(v) } else { a };
    cmd.arg(opt("date"))
        .arg(opt("seller").required(adding))
        .arg(Arg::new("seller_phone").long("seller-phone"))
        .arg(opt("pickup"))
        .arg(Arg::new("scrap_type").long("scrap-type").required(adding))
        .arg(opt("transport"))
        .arg(defaulted(
            Arg::new("transport_cost").long("transport-cost"),
            "0",
        ))
        .arg(opt("quantity").required(adding))
        .arg(defaulted(opt("unit"), "kg"))
        .arg(opt("price").required(adding).help("Price per unit"))
        .arg(opt("paid").help("Actual amount paid, if different"))
        .arg(opt("notes"))
}

fn sale_args(cmd: Command, adding: bool) -> Command {
    let defaulted = |a: Arg, v: &'static str| if adding { a.default_value(v) } else { a };
    cmd.arg(opt("date"))
        .arg(opt("buyer").required(adding).value_parser(value_parser!(i64)))
        .arg(defaulted(
            Arg::new("payment_type").long("payment-type"),
            "Credit",
        ))
        .arg(defaulted(opt("received"), "0"))
        .arg(
            opt("item")
                .required(adding)
                .action(ArgAction::Append)
                .help("PRODUCT_ID:QTY:PRICE[:UNIT], repeatable"),
        )
        .arg(opt("notes"))
}

fn expense_args(cmd: Command, adding: bool) -> Command {
    cmd.arg(opt("date"))
        .arg(
            opt("category")
                .required(adding)
                .value_parser(crate::models::EXPENSE_CATEGORIES),
        )
        .arg(opt("amount").required(adding))
        .arg(opt("description"))
}

pub fn build_cli() -> Command {
    Command::new("khata")
        .version(clap::crate_version!())
        .about("Bookkeeping client: purchases, sales, customer khata, expenses, analytics")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("More log output (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the local store"))
        .subcommand(
            Command::new("config")
                .about("Client configuration")
                .subcommand(
                    Command::new("set-api")
                        .about("Set the backend base URL")
                        .arg(Arg::new("url").required(true)),
                )
                .subcommand(Command::new("show").about("Show effective configuration")),
        )
        .subcommand(
            Command::new("auth")
                .about("Log in and out")
                .subcommand(
                    Command::new("login")
                        .arg(opt("email").required(true))
                        .arg(opt("password").required(true)),
                )
                .subcommand(Command::new("logout"))
                .subcommand(Command::new("whoami"))
                .subcommand(
                    Command::new("change-password")
                        .arg(opt("old").required(true))
                        .arg(opt("new").required(true)),
                ),
        )
        .subcommand(
            Command::new("products")
                .about("Product types sold")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("add")
                        .arg(opt("name").required(true))
                        .arg(opt("description")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(id_arg())
                        .arg(opt("name"))
                        .arg(opt("description")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("buyers")
                .about("Customers and their khata")
                .subcommand(json_flags(Command::new("list").arg(opt("search"))))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(
                    Command::new("add")
                        .arg(opt("name").required(true))
                        .arg(opt("phone"))
                        .arg(opt("address"))
                        .arg(opt("notes"))
                        .arg(
                            Arg::new("opening_balance")
                                .long("opening-balance")
                                .allow_hyphen_values(true)
                                .help("Negative for an advance received"),
                        ),
                )
                .subcommand(
                    Command::new("update")
                        .arg(id_arg())
                        .arg(opt("name"))
                        .arg(opt("phone"))
                        .arg(opt("address"))
                        .arg(opt("notes"))
                        .arg(
                            Arg::new("opening_balance")
                                .long("opening-balance")
                                .allow_hyphen_values(true),
                        ),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(date_range(
                    Command::new("ledger").about("Customer khata").arg(id_arg()),
                )))
                .subcommand(
                    Command::new("pay")
                        .about("Record a payment received")
                        .arg(id_arg())
                        .arg(opt("amount").required(true))
                        .arg(opt("date"))
                        .arg(
                            opt("method")
                                .default_value("Cash")
                                .value_parser(crate::models::PAYMENT_METHODS),
                        )
                        .arg(opt("notes")),
                )
                .subcommand(json_flags(Command::new("payments").arg(id_arg())))
                .subcommand(
                    Command::new("statement")
                        .about("WhatsApp statement link for the customer")
                        .arg(id_arg())
                        .arg(
                            Arg::new("text")
                                .long("text")
                                .action(ArgAction::SetTrue)
                                .help("Print the message text instead of the link"),
                        ),
                ),
        )
        .subcommand(
            Command::new("purchases")
                .about("Scrap purchases")
                .subcommand(json_flags(date_range(
                    Command::new("list")
                        .arg(opt("seller"))
                        .arg(Arg::new("scrap_type").long("scrap-type"))
                        .arg(opt("limit").value_parser(value_parser!(usize))),
                )))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(purchase_args(Command::new("add"), true))
                .subcommand(purchase_args(
                    Command::new("update").about("Change the given fields").arg(id_arg()),
                    false,
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(date_range(Command::new("export").arg(out_arg()))),
        )
        .subcommand(
            Command::new("sales")
                .about("Sales to customers")
                .subcommand(json_flags(date_range(
                    Command::new("list")
                        .arg(opt("buyer").value_parser(value_parser!(i64)))
                        .arg(Arg::new("payment_type").long("payment-type"))
                        .arg(opt("limit").value_parser(value_parser!(usize))),
                )))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(sale_args(Command::new("add"), true))
                .subcommand(sale_args(
                    Command::new("update")
                        .about("Change the given fields; --item replaces all items")
                        .arg(id_arg()),
                    false,
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(date_range(Command::new("export").arg(out_arg()))),
        )
        .subcommand(
            Command::new("expenses")
                .about("Business expenses")
                .subcommand(json_flags(date_range(
                    Command::new("list").arg(opt("category")),
                )))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(expense_args(Command::new("add"), true))
                .subcommand(expense_args(
                    Command::new("update").about("Change the given fields").arg(id_arg()),
                    false,
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(date_range(Command::new("export").arg(out_arg())))
                .subcommand(json_flags(date_range(Command::new("by-category")))),
        )
        .subcommand(
            Command::new("analytics")
                .about("Dashboard and reports")
                .subcommand(json_flags(Command::new("dashboard")))
                .subcommand(
                    Command::new("overview")
                        .about("Monthly, product and top-buyer reports together")
                        .arg(
                            opt("months")
                                .default_value("12")
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(
                            opt("limit")
                                .default_value("10")
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        opt("months")
                            .default_value("12")
                            .value_parser(value_parser!(u32)),
                    ),
                ))
                .subcommand(json_flags(date_range(Command::new("products"))))
                .subcommand(json_flags(
                    Command::new("top-buyers").arg(
                        opt("limit")
                            .default_value("10")
                            .value_parser(value_parser!(u32)),
                    ),
                )),
        )
        .subcommand(
            Command::new("cache")
                .about("Offline response cache")
                .subcommand(Command::new("install").about("Precache the core views and activate"))
                .subcommand(Command::new("activate").about("Drop old cache generations"))
                .subcommand(Command::new("status"))
                .subcommand(Command::new("clear").about("Delete every cache generation")),
        )
        .subcommand(
            Command::new("reminders")
                .about("Daily 10 PM entry reminder")
                .subcommand(
                    Command::new("watch")
                        .about("Run the reminder worker; reads JSON messages from stdin")
                        .arg(
                            opt("origin")
                                .default_value("http://localhost:5173")
                                .help("App origin used for notification clicks"),
                        )
                        .arg(
                            opt("window")
                                .action(ArgAction::Append)
                                .help("URL of an app window already open, repeatable"),
                        ),
                )
                .subcommand(Command::new("enable").about("Confirm reminders are on and stop prompting for them"))
                .subcommand(Command::new("next").about("When the next reminder fires"))
                .subcommand(
                    Command::new("push")
                        .about("Show a push payload immediately")
                        .arg(Arg::new("payload").help("JSON {title, body, tag, url}")),
                ),
        )
        .subcommand(
            Command::new("prompts")
                .about("Install and notification prompt dismissals")
                .subcommand(json_flags(Command::new("status")))
                .subcommand(Command::new("dismiss-install"))
                .subcommand(Command::new("dismiss-notifications"))
                .subcommand(Command::new("reset")),
        )
}
